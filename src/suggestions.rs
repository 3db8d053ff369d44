use crate::theme::Theme;
use rand::{seq::SliceRandom, Rng};

pub const SUGGESTION_COUNT: usize = 4;

/// Draws distinct inspiration words for `theme`.
pub fn pick<R: Rng + ?Sized>(theme: Theme, rng: &mut R) -> Vec<String> {
    theme
        .words()
        .choose_multiple(rng, SUGGESTION_COUNT)
        .map(|w| w.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn picks_four_unique_words_from_the_theme() {
        let mut rng = StdRng::seed_from_u64(7);
        for theme in Theme::all() {
            for _ in 0..50 {
                let words = pick(*theme, &mut rng);
                assert_eq!(words.len(), SUGGESTION_COUNT);

                let mut unique = words.clone();
                unique.sort();
                unique.dedup();
                assert_eq!(unique.len(), SUGGESTION_COUNT);

                assert!(words.iter().all(|w| theme.words().contains(&w.as_str())));
            }
        }
    }

    #[test]
    fn eventually_offers_every_word() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.extend(pick(Theme::Nature, &mut rng));
        }
        assert_eq!(seen.len(), Theme::Nature.words().len());
    }
}
