pub mod config;
pub mod drink;
pub mod goal;
pub mod interval;
pub mod notify;
pub mod stats;
pub mod status;
pub mod watch;

use hydrate_core::Event;

/// Print events the way every command reports them.
pub(crate) fn print_events<'a, I>(events: I) -> Result<(), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = &'a Event>,
{
    for event in events {
        println!("{}", serde_json::to_string_pretty(event)?);
    }
    Ok(())
}
