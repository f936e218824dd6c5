use prism_catalog::entity::EntityRef;
use prism_domain::shuffle::{SeededRng, fisher_yates};

#[derive(Clone, Debug)]
pub(crate) struct ScoredRef {
	pub entity: EntityRef,
	pub score: f64,
}

/// Rank scored candidates: drop non-positive scores, order descending,
/// cap the list, then split it into equal-width score bands and shuffle
/// each band with a seed-derived rng. Equal evidence strength ends up in
/// the same band, so the shuffle diversifies without letting weak
/// candidates leapfrog strong ones.
pub(crate) fn rank(
	mut scored: Vec<ScoredRef>,
	tier_count: u32,
	max_candidates: u32,
	seed: u64,
) -> Vec<EntityRef> {
	scored.retain(|candidate| candidate.score > 0.0);
	scored.sort_by(|a, b| {
		b.score
			.total_cmp(&a.score)
			.then_with(|| a.entity.id.cmp(&b.entity.id))
			.then_with(|| a.entity.source_id.cmp(&b.entity.source_id))
	});
	scored.truncate(max_candidates as usize);

	if scored.len() < 2 {
		return scored.into_iter().map(|candidate| candidate.entity).collect();
	}

	let top = scored[0].score;
	let bottom = scored[scored.len() - 1].score;
	let width = (top - bottom) / f64::from(tier_count.max(1));
	let tier_of = |score: f64| -> u32 {
		if width <= 0.0 {
			return 0;
		}

		(((top - score) / width) as u32).min(tier_count.saturating_sub(1))
	};

	// Descending order makes each tier a contiguous run.
	let mut ranked = Vec::with_capacity(scored.len());
	let mut run_start = 0;

	while run_start < scored.len() {
		let tier = tier_of(scored[run_start].score);
		let run_end = scored[run_start..]
			.iter()
			.position(|candidate| tier_of(candidate.score) != tier)
			.map(|offset| run_start + offset)
			.unwrap_or(scored.len());
		let mut run = scored[run_start..run_end]
			.iter()
			.map(|candidate| candidate.entity.clone())
			.collect::<Vec<_>>();
		let mut rng = SeededRng::new(seed.wrapping_add(u64::from(tier)));

		fisher_yates(&mut run, &mut rng);
		ranked.extend(run);

		run_start = run_end;
	}

	ranked
}
