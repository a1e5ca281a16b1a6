use crate::model::{
    api::home::Tally,
    db::candidate::Candidate,
};

/// `count` as a percentage of `total`, rounded to one decimal place with
/// ties going to the even digit. Zero when nobody has voted yet.
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let scaled = count as f64 / total as f64 * 1000.0;
    let floor = scaled.floor();
    let rounded = if scaled - floor == 0.5 {
        floor + floor % 2.0
    } else {
        scaled.round()
    };
    rounded / 10.0
}

/// Turn per-candidate counts into tallies, most votes first.
/// Candidates with equal counts are ordered by name.
pub fn tally(rows: Vec<(Candidate, u64)>, total: u64) -> Vec<Tally> {
    let mut tallies: Vec<Tally> = rows
        .into_iter()
        .map(|(candidate, vote_count)| Tally {
            candidate: candidate.into(),
            vote_count,
            vote_percentage: percentage(vote_count, total),
        })
        .collect();
    tallies.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.candidate.name.cmp(&b.candidate.name))
    });
    tallies
}
