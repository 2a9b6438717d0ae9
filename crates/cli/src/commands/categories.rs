//! Category palette commands.
//!
//! # Usage
//!
//! ```bash
//! paste-shop categories list
//! paste-shop categories add "Snack Food" --color "#FFAA00"
//! paste-shop categories set-color dairy "#0000FF"
//! paste-shop categories reset-color dairy
//! paste-shop categories delete snack-food
//! ```

use paste_shop_core::CategoryId;

use super::Session;
use crate::error::CliError;

/// Print the user's palette.
#[allow(clippy::print_stdout)]
pub async fn list(session: &Session) -> Result<(), CliError> {
    let categories = session.client().categories();
    let palette = categories.initialize(session.user()).await?;

    for category in palette.categories() {
        let kind = if category.id.is_standard() { "standard" } else { "custom" };
        println!("{:<20} {:<24} {}  {kind}", category.id, category.name, category.color);
    }
    println!();
    println!(
        "{} of {} custom categories used.",
        palette.custom_count(),
        categories.max_custom()
    );
    Ok(())
}

/// Add a custom category and print its id.
#[allow(clippy::print_stdout)]
pub async fn add(session: &Session, name: &str, color: &str) -> Result<(), CliError> {
    let category = session
        .client()
        .categories()
        .add_category(session.user(), name, color)
        .await?;
    println!("{}", category.id);
    Ok(())
}

/// Change a category's color.
pub async fn set_color(session: &Session, id: &CategoryId, color: &str) -> Result<(), CliError> {
    session
        .client()
        .categories()
        .update_category_color(session.user(), id, color)
        .await?;
    Ok(())
}

/// Restore a category's built-in color.
pub async fn reset_color(session: &Session, id: &CategoryId) -> Result<(), CliError> {
    session
        .client()
        .categories()
        .reset_category_color(session.user(), id)
        .await?;
    Ok(())
}

/// Delete a custom category.
pub async fn delete(session: &Session, id: &CategoryId) -> Result<(), CliError> {
    session
        .client()
        .categories()
        .delete_category(session.user(), id)
        .await?;
    Ok(())
}
