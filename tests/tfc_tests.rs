// tests/tfc_tests.rs

use proptest::prelude::*;
use revarith::{
    from_tfc, mod_adder, synthesize, to_tfc, AdderKind, Circuit, CircuitBuilder, Control, Gate, LineId, RevError,
    TruthTable,
};

fn reparsed(circuit: &Circuit) -> Result<Circuit, RevError> {
    let parsed = from_tfc(&to_tfc(circuit))?;
    assert_eq!(parsed.num_lines(), circuit.num_lines());
    assert_eq!(parsed.flatten(), circuit.flatten());
    assert_eq!(parsed.quantum_cost(), circuit.quantum_cost());
    Ok(parsed)
}

#[test]
fn test_modular_adder_survives_round_trip() -> Result<(), RevError> {
    for kind in [AdderKind::Vbe, AdderKind::Cdkm] {
        let adder = mod_adder(kind, 3, 5)?;
        let parsed = reparsed(&adder)?;
        assert_eq!(parsed.name(), "tfc");
        assert_eq!(parsed.register("v")?.width(), adder.num_lines());
    }
    Ok(())
}

#[test]
fn test_synthesized_function_survives_round_trip() -> Result<(), RevError> {
    let table = TruthTable::from_fn(4, |i| matches!(i, 1 | 2 | 7 | 11 | 12 | 14))?;
    let circuit = synthesize(&table)?.esop.to_circuit()?;
    let text = to_tfc(&circuit);
    assert!(text.starts_with("# circuit 'esop'"));
    assert!(text.contains(".v x0,x1,x2,x3,f0\n"));
    reparsed(&circuit)?;
    Ok(())
}

#[test]
fn test_comments_and_blank_lines_are_skipped() -> Result<(), RevError> {
    let text = "# header\n\n.v a,b\n.i a\n.o b\nBEGIN\n# body comment\nT2 a',b\n\nEND\n";
    let circuit = from_tfc(text)?;
    assert_eq!(circuit.flatten(), vec![Gate::new(LineId(1), vec![Control::neg(LineId(0))])?]);
    Ok(())
}

fn gate_strategy(lines: usize) -> impl Strategy<Value = (usize, Vec<(usize, bool)>)> {
    (0..lines, proptest::collection::vec((0..lines, any::<bool>()), 0..4))
}

proptest! {
    #[test]
    fn test_random_gate_lists_round_trip(specs in proptest::collection::vec(gate_strategy(6), 0..24)) {
        let mut b = CircuitBuilder::new("random");
        let v = b.data("v", 6);
        for (target, raw_controls) in specs {
            let mut controls: Vec<Control> = Vec::new();
            for (line, positive) in raw_controls {
                if line != target && controls.iter().all(|c| c.line != v.line(line)) {
                    controls.push(Control::with_polarity(v.line(line), positive));
                }
            }
            let gate = Gate::new(v.line(target), controls).map_err(|e| TestCaseError::fail(e.to_string()))?;
            b.gate(gate).map_err(|e| TestCaseError::fail(e.to_string()))?;
        }
        let circuit = b.build();
        let parsed = from_tfc(&to_tfc(&circuit)).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed.flatten(), circuit.flatten());
    }
}
