use seatgrid_state::{TermStore, now_epoch_secs};

pub fn select(store: &TermStore, term: &str, user: &str, course: &str, rank: u32) -> anyhow::Result<()> {
    let selection = store.submit_selection(term, user, course, rank, now_epoch_secs())?;
    println!(
        "✓ {} ranked {} as choice {} for term {}",
        selection.user_id, selection.course_id, selection.rank, selection.term_id
    );
    Ok(())
}
