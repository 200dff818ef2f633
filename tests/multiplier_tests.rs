// tests/multiplier_tests.rs

use revarith::classical::mod_pow;
use revarith::multiplier::c_mult_mod_ancillas;
use revarith::{c_mult_mod, check_ancillas_clean, exp_mod, AdderKind, Compiler, CompilerConfig, Evaluator, RevError};
use rstest::rstest;

#[rstest]
#[case(AdderKind::Cdkm, 3, 3, 7)]
#[case(AdderKind::Vbe, 3, 5, 7)]
#[case(AdderKind::Cdkm, 4, 7, 15)]
#[case(AdderKind::Vbe, 4, 4, 13)]
fn test_controlled_multiply_branches(
    #[case] kind: AdderKind,
    #[case] n: usize,
    #[case] a: u64,
    #[case] modulus: u64,
) -> Result<(), RevError> {
    let circuit = c_mult_mod(kind, n, a, modulus)?;
    assert_eq!(circuit.ancilla_count(), c_mult_mod_ancillas(kind, n));
    let eval = Evaluator::new(&circuit);
    for x in 0..modulus {
        let on = eval.run(&[("c", 1), ("x", x)])?;
        assert_eq!(on.read_register(circuit.register("y")?), a * x % modulus);
        assert_eq!(on.read_register(circuit.register("x")?), x);
        check_ancillas_clean(&circuit, &on)?;

        let off = eval.run(&[("c", 0), ("x", x)])?;
        assert_eq!(off.read_register(circuit.register("y")?), x);
        check_ancillas_clean(&circuit, &off)?;
    }
    Ok(())
}

#[rstest]
fn test_exponentiation_example(#[values(AdderKind::Vbe, AdderKind::Cdkm)] kind: AdderKind) -> Result<(), RevError> {
    // n = 2, N = 3, a = 2, x = 0b11: 2^3 mod 3 = 2
    let circuit = exp_mod(kind, 2, 2, 3)?;
    let out = Evaluator::new(&circuit).run(&[("x", 0b11)])?;
    assert_eq!(out.read_register(circuit.register("one")?), 2);
    check_ancillas_clean(&circuit, &out)?;
    Ok(())
}

#[test]
fn test_exponentiation_over_all_exponents() -> Result<(), RevError> {
    let compiler = Compiler::new(CompilerConfig::default());
    let (n, a, modulus) = (3, 3, 7);
    let circuit = compiler.exp_mod(n, a, modulus)?;
    let eval = Evaluator::new(&circuit);
    for x in 0..1u64 << (2 * n) {
        let out = eval.run(&[("x", x)])?;
        assert_eq!(out.read_register(circuit.register("one")?), mod_pow(a, x, modulus), "{}^{} mod {}", a, x, modulus);
        assert_eq!(out.read_register(circuit.register("x")?), x);
        check_ancillas_clean(&circuit, &out)?;
    }
    Ok(())
}

#[test]
fn test_non_invertible_base_fails_before_emitting() {
    let err = exp_mod(AdderKind::Cdkm, 4, 5, 15).map(|c| c.gate_count());
    assert_eq!(err, Err(RevError::InverseNotDefined { value: 5, modulus: 15 }));
}
