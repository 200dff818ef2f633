// tests/adder_tests.rs

use proptest::prelude::*;
use revarith::adders::{mod_adder_ancillas, plain_adder};
use revarith::{check_ancillas_clean, mod_adder, AdderKind, BitState, Evaluator, LineId, RevError};
use rstest::rstest;

#[rstest]
fn test_adder_then_inverse_is_identity(
    #[values(AdderKind::Vbe, AdderKind::Cdkm)] kind: AdderKind,
    #[values(1, 2, 4)] n: usize,
) -> Result<(), RevError> {
    let adder = plain_adder(kind, n)?;
    let round_trip = adder.sequence(&adder.invert())?;
    let eval = Evaluator::new(&round_trip);
    for a in 0..1u64 << n {
        for b in 0..1u64 << n {
            let out = eval.run(&[("a", a), ("b", b)])?;
            assert_eq!(out.read_register(round_trip.register("a")?), a);
            assert_eq!(out.read_register(round_trip.register("b")?), b);
            check_ancillas_clean(&round_trip, &out)?;
        }
    }
    Ok(())
}

#[rstest]
fn test_modular_addition_is_exhaustively_correct(
    #[values(AdderKind::Vbe, AdderKind::Cdkm)] kind: AdderKind,
    #[values(2, 3, 5, 7, 11, 13, 15)] modulus: u64,
) -> Result<(), RevError> {
    let n = 4;
    let adder = mod_adder(kind, n, modulus)?;
    assert_eq!(adder.ancilla_count(), mod_adder_ancillas(kind, n));
    let eval = Evaluator::new(&adder);
    for a in 0..modulus {
        for b in 0..modulus {
            let out = eval.run(&[("a", a), ("b", b)])?;
            assert_eq!(out.read_register(adder.register("b")?), (a + b) % modulus, "{} + {} mod {}", a, b, modulus);
            assert_eq!(out.read_register(adder.register("a")?), a);
            check_ancillas_clean(&adder, &out)?;
        }
    }
    Ok(())
}

#[test]
fn test_modular_adder_at_full_width() -> Result<(), RevError> {
    // N uses every bit of the register.
    let adder = mod_adder(AdderKind::Cdkm, 3, 7)?;
    let out = Evaluator::new(&adder).run(&[("a", 6), ("b", 6)])?;
    assert_eq!(out.read_register(adder.register("b")?), 5);
    Ok(())
}

#[test]
fn test_modulus_too_wide_is_rejected() {
    assert!(matches!(mod_adder(AdderKind::Vbe, 3, 9), Err(RevError::Parameter { .. })));
    assert!(matches!(plain_adder(AdderKind::Cdkm, 0), Err(RevError::Parameter { .. })));
}

proptest! {
    #[test]
    fn test_round_trip_on_arbitrary_states(bits in proptest::collection::vec(any::<bool>(), 12), vbe in any::<bool>()) {
        let kind = if vbe { AdderKind::Vbe } else { AdderKind::Cdkm };
        let adder = plain_adder(kind, 3).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let round_trip = adder.sequence(&adder.invert()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        // Data lines get random values; ancillas start clean.
        let mut state = BitState::zeros(round_trip.num_lines());
        for (line, bit) in round_trip.data_lines().into_iter().zip(bits) {
            state.set(line, bit);
        }
        let before = state.clone();
        Evaluator::new(&round_trip).run_state(&mut state);
        prop_assert_eq!(state, before);
    }

    #[test]
    fn test_inverse_adder_subtracts(a in 0u64..16, b in 0u64..32) {
        let sub = plain_adder(AdderKind::Cdkm, 4).map_err(|e| TestCaseError::fail(e.to_string()))?.invert();
        let out = Evaluator::new(&sub).run(&[("a", a), ("b", b)]).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let b_lines: Vec<LineId> = (4..9).map(LineId).collect();
        prop_assert_eq!(out.read(&b_lines), (b + 32 - a) % 32);
    }
}
