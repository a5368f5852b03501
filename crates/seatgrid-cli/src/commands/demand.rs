use seatgrid_state::TermStore;

use super::Format;

pub fn show(store: &TermStore, term: &str, format: Format) -> anyhow::Result<()> {
    let demand = store.course_demand(term)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&demand)?),
        Format::Text => {
            println!(
                "{:<16} {:<12} {:>8} {:>8} {:>10}",
                "COURSE", "CODE", "SEATS", "REQUESTS", "REMAINING"
            );
            for d in &demand {
                let marker = if d.seats_remaining < 0 { "  ⚠️ oversubscribed" } else { "" };
                println!(
                    "{:<16} {:<12} {:>8} {:>8} {:>10}{marker}",
                    d.course_id, d.code, d.capacity, d.current_requests, d.seats_remaining
                );
            }
        }
    }
    Ok(())
}
