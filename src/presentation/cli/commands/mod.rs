pub mod clone;
pub mod group;
pub mod project;

pub use clone::{CloneCommand, CloneGroupOptions};
pub use group::GroupCommand;
pub use project::ProjectCommand;

use serde::Serialize;

use super::OutputFormat;
use crate::common::result::WildfireResult;
use crate::domain::entities::registry::Registry;
use crate::infrastructure::filesystem::registry_store::RegistryStore;
use crate::presentation::ui::display::DisplayHelper;

/// Load the registry, apply `change`, and save only when it reports an update
///
/// `change` returns `Ok(true)` when the registry must be written back.
pub(crate) fn update_registry<F>(
    store: &RegistryStore,
    display: &DisplayHelper,
    change: F,
) -> WildfireResult<()>
where
    F: FnOnce(&mut Registry) -> WildfireResult<bool>,
{
    let mut registry = store.load()?;
    if change(&mut registry)? {
        store.save(&registry)?;
        display.info("Configuration has been updated.");
    } else {
        display.info("Dousing WildFire.");
    }
    Ok(())
}

/// Print `value` as JSON or YAML
pub(crate) fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> WildfireResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Text => {}
    }
    Ok(())
}
