//! Write-path command handlers: `add`, `edit` and `delete`.
//!
//! Input is validated through [`ShopForm`] before any request is sent, so a
//! rejected form never reaches the database.

use clap::Args;
use laundrygo_core::{format_accuracy, AppConfig, ShopForm};
use laundrygo_feed::RealtimeClient;

/// Fields of a new shop.
#[derive(Debug, Args)]
pub(crate) struct ShopArgs {
    #[arg(long)]
    pub name: String,
    /// Position as "<lat>,<lng>"
    #[arg(long, allow_hyphen_values = true)]
    pub coordinates: String,
    /// Accuracy of the position in metres
    #[arg(long)]
    pub accuracy: Option<f64>,
    /// Phone number starting with 628
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub price: Option<String>,
    /// Comma-separated facilities
    #[arg(long)]
    pub facilities: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub hours: Option<String>,
}

impl ShopArgs {
    pub(crate) fn to_form(&self) -> ShopForm {
        ShopForm {
            name: self.name.clone(),
            coordinates: self.coordinates.clone(),
            accuracy: self.accuracy.map(|m| accuracy_text(Some(m))).unwrap_or_default(),
            phone: self.phone.clone(),
            price_per_kg: self.price.clone().unwrap_or_default(),
            facilities: self.facilities.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            operating_hours: self.hours.clone().unwrap_or_default(),
        }
    }
}

/// Changes to an existing shop. Omitted fields keep their stored value.
#[derive(Debug, Args)]
pub(crate) struct EditArgs {
    /// Key of the shop to update
    #[arg(allow_hyphen_values = true)]
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub coordinates: Option<String>,
    #[arg(long)]
    pub accuracy: Option<f64>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub facilities: Option<String>,
    #[arg(long)]
    pub hours: Option<String>,
}

impl EditArgs {
    /// Overlay the given fields onto a form loaded from the stored record.
    pub(crate) fn apply(&self, form: &mut ShopForm) {
        let overlay = [
            (&mut form.name, &self.name),
            (&mut form.coordinates, &self.coordinates),
            (&mut form.phone, &self.phone),
            (&mut form.price_per_kg, &self.price),
            (&mut form.facilities, &self.facilities),
            (&mut form.operating_hours, &self.hours),
        ];
        for (field, value) in overlay {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
        if let Some(accuracy) = self.accuracy {
            form.accuracy = accuracy_text(Some(accuracy));
        }
    }
}

/// Stored accuracy text: the number with two decimals and no unit.
fn accuracy_text(accuracy_m: Option<f64>) -> String {
    let shown = format_accuracy(accuracy_m);
    shown.strip_suffix(" m").unwrap_or_default().to_string()
}

/// Validate and create a shop, printing its new key.
///
/// # Errors
///
/// Returns an error if the form is invalid, the client cannot be built, or
/// the request fails.
pub(crate) async fn run_add(config: &AppConfig, args: &ShopArgs) -> anyhow::Result<()> {
    let draft = args.to_form().validate_new()?;
    let client = RealtimeClient::from_config(config)?;
    let key = client.create_record(&config.points_path, &draft).await?;
    tracing::info!(key = %key, name = %draft.name, "shop created");
    println!("created {key}");
    Ok(())
}

/// Load a shop, apply the changes and write it back.
///
/// # Errors
///
/// Returns an error if the shop does not exist, the edited form is invalid,
/// or a request fails.
pub(crate) async fn run_edit(config: &AppConfig, args: &EditArgs) -> anyhow::Result<()> {
    let client = RealtimeClient::from_config(config)?;
    let record = client
        .fetch_record(&config.points_path, &args.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("shop '{}' not found", args.id))?;

    let mut form = ShopForm::from_record(&record);
    args.apply(&mut form);
    let draft = form.validate_edit(&args.id)?;
    client
        .update_record(&config.points_path, &args.id, &draft)
        .await?;
    tracing::info!(key = %args.id, "shop updated");
    println!("updated {}", args.id);
    Ok(())
}

/// Remove a shop.
///
/// # Errors
///
/// Returns an error if the key is invalid or the request fails.
pub(crate) async fn run_delete(config: &AppConfig, id: &str) -> anyhow::Result<()> {
    let client = RealtimeClient::from_config(config)?;
    client.delete_record(&config.points_path, id).await?;
    tracing::info!(key = %id, "shop deleted");
    println!("deleted {id}");
    Ok(())
}
