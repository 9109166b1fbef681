//! Random display-name generation.

// crates.io
use rand::Rng;

const ADJECTIVES: [&str; 24] = [
	"Brave", "Calm", "Clever", "Cozy", "Curly", "Eager", "Fancy", "Gentle", "Happy", "Jolly",
	"Kind", "Lucky", "Mellow", "Merry", "Nimble", "Proud", "Quick", "Quiet", "Shy", "Sleepy",
	"Sunny", "Swift", "Tidy", "Witty",
];
const NOUNS: [&str; 24] = [
	"Bear", "Bee", "Cat", "Crane", "Deer", "Dove", "Duck", "Eagle", "Elk", "Finch", "Fox", "Frog",
	"Hawk", "Koala", "Lark", "Lion", "Moose", "Otter", "Owl", "Panda", "Puma", "Seal", "Swan",
	"Wolf",
];

/// Produces candidate display names; the caller checks availability.
pub trait NicknameSource
where
	Self: Send + Sync,
{
	/// Returns one candidate name.
	fn generate(&self) -> String;
}

/// Adjective + noun + 2 to 4 digit suffix, at most 15 characters (`SleepyOtter4821`).
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNickname;
impl NicknameSource for RandomNickname {
	fn generate(&self) -> String {
		let mut rng = rand::rng();
		let adjective = ADJECTIVES[rng.random_range(0..ADJECTIVES.len())];
		let noun = NOUNS[rng.random_range(0..NOUNS.len())];
		let suffix = match rng.random_range(2..=4) {
			2 => rng.random_range(10..100),
			3 => rng.random_range(100..1_000),
			_ => rng.random_range(1_000..10_000),
		};

		format!("{adjective}{noun}{suffix}")
	}
}
