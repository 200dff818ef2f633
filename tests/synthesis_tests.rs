// tests/synthesis_tests.rs

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use revarith::operations::sequence_cost;
use revarith::synthesis::hypercube::{pad_to_permutation, permutation_circuit};
use revarith::synthesis::{minterms, reed_muller};
use revarith::{check_truth_table, evaluate, synthesize, RevError, TruthTable};

fn check_synthesis(table: &TruthTable) -> Result<(), RevError> {
    let result = synthesize(table)?;
    let circuit = result.esop.to_circuit()?;
    let x = circuit.register("x")?.lines();
    let f = circuit.register("f")?.line(0);
    check_truth_table(&circuit, &x, f, table)?;

    assert_eq!(result.cost, circuit.quantum_cost());
    assert_eq!(result.cost, sequence_cost(&circuit.flatten()));
    assert!(result.cost <= minterms(table).cost());
    assert!(result.cost <= reed_muller(table).simplify().cost());
    Ok(())
}

#[test]
fn test_every_function_of_one_to_three_inputs() -> Result<(), RevError> {
    for n in 1..=3usize {
        for code in 0u64..1 << (1 << n) {
            let table = TruthTable::from_fn(n, |i| (code >> i) & 1 == 1)?;
            check_synthesis(&table)?;
        }
    }
    Ok(())
}

#[test]
fn test_every_function_of_four_inputs() -> Result<(), RevError> {
    for code in 0u64..1 << 16 {
        let table = TruthTable::from_fn(4, |i| (code >> i) & 1 == 1)?;
        let result = synthesize(&table)?;
        assert_eq!(result.esop.to_table()?, table, "function {:#06x}", code);
    }
    Ok(())
}

#[test]
fn test_random_functions_of_five_and_six_inputs() -> Result<(), RevError> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for n in [5usize, 6] {
        for _ in 0..40 {
            let density = rng.random_range(0.05..0.95);
            let bits: Vec<bool> = (0..1usize << n).map(|_| rng.random_bool(density)).collect();
            check_synthesis(&TruthTable::new(n, bits)?)?;
        }
    }
    Ok(())
}

#[test]
fn test_structured_functions_stay_small() -> Result<(), RevError> {
    // Parity of six inputs is six CNOTs.
    let parity = TruthTable::from_fn(6, |i| i.count_ones() % 2 == 1)?;
    let result = synthesize(&parity)?;
    assert_eq!(result.esop.terms().len(), 6);
    assert_eq!(result.cost, 6);

    // Majority of three is three Toffolis at most.
    let majority = TruthTable::from_fn(3, |i| i.count_ones() >= 2)?;
    assert!(synthesize(&majority)?.cost <= 15);
    Ok(())
}

#[test]
fn test_random_permutations_are_realized() -> Result<(), RevError> {
    let mut rng = StdRng::seed_from_u64(42);
    for lines in 1..=4usize {
        for _ in 0..10 {
            let mut permutation: Vec<u64> = (0..1u64 << lines).collect();
            permutation.shuffle(&mut rng);
            let circuit = permutation_circuit(&permutation, lines)?;
            for (i, &image) in permutation.iter().enumerate() {
                let out = evaluate(&circuit, &[("q", i as u64)])?;
                assert_eq!(out.read_register(circuit.register("q")?), image);
            }
        }
    }
    Ok(())
}

#[test]
fn test_padded_tables_keep_their_values() -> Result<(), RevError> {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<u64> = (0..16).map(|_| rng.random_range(0..4u64)).collect();
    let padded = pad_to_permutation(&values, 2)?;
    let circuit = permutation_circuit(&padded.permutation, padded.lines)?;
    for (i, &v) in values.iter().enumerate() {
        let out = evaluate(&circuit, &[("q", i as u64)])?;
        assert_eq!(out.read_register(circuit.register("q")?) & 0b11, v);
    }
    Ok(())
}

#[test]
fn test_oversized_tables_are_rejected() {
    assert!(matches!(TruthTable::new(17, Vec::new()), Err(RevError::Parameter { .. })));
    assert!(matches!(TruthTable::new(2, vec![true; 3]), Err(RevError::Parameter { .. })));
}
