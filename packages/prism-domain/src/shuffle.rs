/// Stable per-item ordering key for randomized sorts. The same
/// `(seed, id)` pair always yields the same key, across calls and across
/// processes, so paginated callers sorting by this key never see an item
/// repeated or skipped while the seed holds.
pub fn ordering_key(seed: u64, id: &str) -> u64 {
	let mut hasher = blake3::Hasher::new();

	hasher.update(&seed.to_le_bytes());
	hasher.update(id.as_bytes());

	let digest = hasher.finalize();
	let mut bytes = [0_u8; 8];

	bytes.copy_from_slice(&digest.as_bytes()[..8]);

	u64::from_le_bytes(bytes)
}

/// Derive a numeric seed from arbitrary caller-supplied seed material.
pub fn seed_from_parts(parts: &[&str]) -> u64 {
	let mut hasher = blake3::Hasher::new();

	for part in parts {
		hasher.update(part.as_bytes());
		hasher.update(&[0]);
	}

	let digest = hasher.finalize();
	let mut bytes = [0_u8; 8];

	bytes.copy_from_slice(&digest.as_bytes()[..8]);

	u64::from_le_bytes(bytes)
}

/// Deterministic splitmix64 generator. Not cryptographic; only used to make
/// shuffles reproducible for a given seed.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
	state: u64,
}

impl SeededRng {
	pub fn new(seed: u64) -> Self {
		Self { state: seed }
	}

	pub fn next_u64(&mut self) -> u64 {
		self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);

		let mut z = self.state;

		z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
		z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);

		z ^ (z >> 31)
	}

	/// Uniform in `0..bound`; `bound` of 0 returns 0.
	pub fn next_below(&mut self, bound: usize) -> usize {
		if bound == 0 {
			return 0;
		}

		(self.next_u64() % bound as u64) as usize
	}
}

/// In-place Fisher–Yates driven by a [`SeededRng`], so the permutation is a
/// pure function of the seed and the input order.
pub fn fisher_yates<T>(items: &mut [T], rng: &mut SeededRng) {
	for i in (1..items.len()).rev() {
		let j = rng.next_below(i + 1);

		items.swap(i, j);
	}
}
