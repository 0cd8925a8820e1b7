//! The Boolean minimizer (§4.5): a two-level Quine–McCluskey implementation
//! behind the narrow `Minimizer` trait. There is no crate in the workspace
//! dependency graph for two-level logic minimization, so this is written
//! from scratch in the same low-level bit-table style as the rest of the
//! engine (cf. `bits::submasks`), not imported from anywhere.

use std::collections::BTreeSet;

/// One product term in a sum-of-products cover. A bit set in `care_mask`
/// is a required literal whose polarity is read from the same bit of
/// `value_bits`; bits cleared in `care_mask` are don't-cares within the
/// product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub value_bits: u32,
    pub care_mask: u32,
}

/// The simplified form of one polarity of one equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinimizedForm {
    True,
    False,
    Products(Vec<Product>),
}

/// Narrow capability the Equation Emitter calls twice per pin (once per
/// polarity). Every on-minterm must be covered by at least one returned
/// product; no minterm outside `on_minterms ∪ dont_care_minterms` may be
/// covered.
pub trait Minimizer {
    fn simplify(
        &self,
        input_count: u32,
        on_minterms: &BTreeSet<u32>,
        dont_care_minterms: &BTreeSet<u32>,
    ) -> MinimizedForm;
}

/// Classic Quine–McCluskey: generate prime implicants by repeatedly
/// combining terms that differ in exactly one cared bit, then cover the
/// on-minterms with essential primes first and a greedy largest-coverage
/// choice for whatever remains.
pub struct QuineMcCluskey;

impl Minimizer for QuineMcCluskey {
    fn simplify(
        &self,
        input_count: u32,
        on_minterms: &BTreeSet<u32>,
        dont_care_minterms: &BTreeSet<u32>,
    ) -> MinimizedForm {
        if on_minterms.is_empty() {
            return MinimizedForm::False;
        }

        let full_mask = if input_count == 0 {
            0
        } else {
            (1u32 << input_count) - 1
        };

        let seed: Vec<(u32, u32)> = on_minterms
            .iter()
            .chain(dont_care_minterms.iter())
            .map(|&m| (m & full_mask, full_mask))
            .collect();

        let primes = generate_primes(seed);

        if primes.iter().any(|&(_, mask)| mask == 0) {
            return MinimizedForm::True;
        }

        MinimizedForm::Products(
            select_cover(&primes, on_minterms)
                .into_iter()
                .map(|(value_bits, care_mask)| Product {
                    value_bits,
                    care_mask,
                })
                .collect(),
        )
    }
}

/// Repeatedly combine term pairs that share a care mask and differ in
/// exactly one of its bits, clearing that bit to produce the next round's
/// term. A term that never combines in a round is a prime implicant.
fn generate_primes(terms: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    let mut terms = terms;
    terms.sort_unstable();
    terms.dedup();

    let mut primes: Vec<(u32, u32)> = Vec::new();

    loop {
        let mut combined = vec![false; terms.len()];
        let mut next: Vec<(u32, u32)> = Vec::new();

        for i in 0..terms.len() {
            for j in (i + 1)..terms.len() {
                let (vi, mi) = terms[i];
                let (vj, mj) = terms[j];
                if mi != mj {
                    continue;
                }
                let diff = (vi ^ vj) & mi;
                if diff != 0 && diff & (diff - 1) == 0 {
                    let merged_mask = mi & !diff;
                    let merged = (vi & merged_mask, merged_mask);
                    if !next.contains(&merged) {
                        next.push(merged);
                    }
                    combined[i] = true;
                    combined[j] = true;
                }
            }
        }

        for (idx, &term) in terms.iter().enumerate() {
            if !combined[idx] && !primes.contains(&term) {
                primes.push(term);
            }
        }

        if next.is_empty() {
            break;
        }
        next.sort_unstable();
        next.dedup();
        terms = next;
    }

    primes
}

fn covers(prime: (u32, u32), minterm: u32) -> bool {
    let (value_bits, care_mask) = prime;
    (minterm & care_mask) == (value_bits & care_mask)
}

/// Essential-prime-implicant selection followed by a greedy cover of
/// whatever on-minterms remain uncovered.
fn select_cover(primes: &[(u32, u32)], on_minterms: &BTreeSet<u32>) -> Vec<(u32, u32)> {
    let mut remaining: BTreeSet<u32> = on_minterms.clone();
    let mut cover: Vec<(u32, u32)> = Vec::new();

    for &m in on_minterms {
        let mut coverers = primes.iter().filter(|&&p| covers(p, m));
        if let (Some(&only), None) = (coverers.next(), coverers.next()) {
            if !cover.contains(&only) {
                cover.push(only);
            }
        }
    }
    for &p in &cover {
        remaining.retain(|&m| !covers(p, m));
    }

    while !remaining.is_empty() {
        let best = *primes
            .iter()
            .max_by_key(|&&p| remaining.iter().filter(|&&m| covers(p, m)).count())
            .expect("on_minterms is non-empty, so some prime implicant must cover it");
        remaining.retain(|&m| !covers(best, m));
        if !cover.contains(&best) {
            cover.push(best);
        }
    }

    cover.sort_unstable();
    cover
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert;

    fn set(items: &[u32]) -> BTreeSet<u32> {
        items.iter().cloned().collect()
    }

    #[test]
    fn two_input_and_reduces_to_one_product() {
        let qm = QuineMcCluskey;
        let on = set(&[0b11]);
        let form = qm.simplify(2, &on, &BTreeSet::new());
        match form {
            MinimizedForm::Products(products) => {
                assert_eq!(products.len(), 1);
                assert_eq!(products[0].care_mask, 0b11);
                assert_eq!(products[0].value_bits, 0b11);
            }
            other => panic!("expected a single product, got {other:?}"),
        }
    }

    #[test]
    fn empty_on_set_is_constant_false() {
        let qm = QuineMcCluskey;
        assert_eq!(
            qm.simplify(3, &BTreeSet::new(), &BTreeSet::new()),
            MinimizedForm::False
        );
    }

    #[test]
    fn s6_dont_care_reduction_collapses_to_true_or_tiny_cover() {
        let qm = QuineMcCluskey;
        let on = set(&[0b000, 0b111]);
        let dc = set(&[0b001, 0b010, 0b100, 0b011, 0b101, 0b110]);
        let form = qm.simplify(3, &on, &dc);
        match form {
            MinimizedForm::True => {}
            MinimizedForm::Products(products) => assert!(products.len() <= 2),
            MinimizedForm::False => panic!("on-minterms exist, cannot be constant false"),
        }
    }

    #[test]
    fn soundness_every_on_minterm_covered_no_off_minterm_covered() {
        let qm = QuineMcCluskey;
        let on = set(&[0b0001, 0b0011, 0b0111, 0b1111]);
        let dc = set(&[0b1000]);
        let off: BTreeSet<u32> = (0..16u32).filter(|m| !on.contains(m) && !dc.contains(m)).collect();

        let form = qm.simplify(4, &on, &dc);
        let products = match form {
            MinimizedForm::Products(p) => p,
            MinimizedForm::True => panic!("on ∪ dont-care here is far short of the full universe"),
            MinimizedForm::False => panic!("on-minterms exist, cannot be constant false"),
        };

        for &m in &on {
            assert!(
                products.iter().any(|p| (m & p.care_mask) == (p.value_bits & p.care_mask)),
                "on-minterm {m:#b} not covered"
            );
        }
        for &m in &off {
            assert!(
                !products.iter().any(|p| (m & p.care_mask) == (p.value_bits & p.care_mask)),
                "off-minterm {m:#b} incorrectly covered"
            );
        }
    }

    proptest::proptest! {
        /// Same soundness property as above, but over randomly generated
        /// on/don't-care sets instead of hand-picked ones: whatever cover
        /// comes back must still agree with the input classification on
        /// every point of the universe.
        #[test]
        fn soundness_holds_for_random_minterm_sets(
            bits in 2u32..6,
            raw_on in proptest::collection::vec(0u32..64, 0..20),
            raw_dc in proptest::collection::vec(0u32..64, 0..10),
        ) {
            let mask = (1u32 << bits) - 1;
            let dc: BTreeSet<u32> = raw_dc.iter().map(|m| m & mask).collect();
            let on: BTreeSet<u32> = raw_on
                .iter()
                .map(|m| m & mask)
                .filter(|m| !dc.contains(m))
                .collect();

            let qm = QuineMcCluskey;
            let form = qm.simplify(bits, &on, &dc);

            for point in 0..=mask {
                let is_on = on.contains(&point);
                let is_dc = dc.contains(&point);
                let covered = match &form {
                    MinimizedForm::True => true,
                    MinimizedForm::False => false,
                    MinimizedForm::Products(products) => products
                        .iter()
                        .any(|p| (point & p.care_mask) == (p.value_bits & p.care_mask)),
                };
                if is_on {
                    prop_assert!(covered, "on-minterm {point:#b} not covered");
                } else if !is_dc {
                    prop_assert!(!covered, "off-minterm {point:#b} incorrectly covered");
                }
            }
        }
    }
}
