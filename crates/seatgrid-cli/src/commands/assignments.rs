use seatgrid_state::TermStore;

use super::Format;

pub fn list(store: &TermStore, term: &str, format: Format) -> anyhow::Result<()> {
    let rows = store.list_assignments(term)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        Format::Text => {
            if rows.is_empty() {
                println!("No assignments stored for term {term}.");
                return Ok(());
            }
            println!("{:<20} {:<20} {:>4}", "STUDENT", "COURSE", "RANK");
            for r in &rows {
                println!("{:<20} {:<20} {:>4}", r.user_id, r.course_id, r.assigned_rank);
            }
            println!("\n{} assignments", rows.len());
        }
    }
    Ok(())
}
