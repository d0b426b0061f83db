//! Toy single-qubit circuit builder.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    H,
    X,
    Z,
    Cnot,
}

impl Gate {
    pub const ALL: [Gate; 4] = [Gate::H, Gate::X, Gate::Z, Gate::Cnot];

    pub fn symbol(self) -> &'static str {
        match self {
            Gate::H => "H",
            Gate::X => "X",
            Gate::Z => "Z",
            Gate::Cnot => "CNOT",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Gate::H => "Hadamard",
            Gate::X => "Pauli-X",
            Gate::Z => "Pauli-Z",
            Gate::Cnot => "CNOT",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Gate::H => "Creates superposition",
            Gate::X => "Bit flip (NOT gate)",
            Gate::Z => "Phase flip",
            Gate::Cnot => "Controlled NOT",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Circuit {
    gates: Vec<Gate>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, gate: Gate) {
        self.gates.push(gate);
    }

    pub fn reset(&mut self) {
        self.gates.clear();
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// Displayed output state. Any Hadamard shows superposition; otherwise
    /// any X shows `|1⟩`. Gate order is not simulated.
    pub fn state_label(&self) -> &'static str {
        if self.gates.contains(&Gate::H) {
            "(|0⟩ + |1⟩)/√2"
        } else if self.gates.contains(&Gate::X) {
            "|1⟩"
        } else {
            "|0⟩"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_labels() {
        let mut c = Circuit::new();
        assert_eq!(c.state_label(), "|0⟩");
        c.push(Gate::Z);
        c.push(Gate::Cnot);
        assert_eq!(c.state_label(), "|0⟩");
        c.push(Gate::X);
        assert_eq!(c.state_label(), "|1⟩");
        c.push(Gate::H);
        assert_eq!(c.state_label(), "(|0⟩ + |1⟩)/√2");
        assert_eq!(c.gates().len(), 4);

        c.reset();
        assert!(c.gates().is_empty());
        assert_eq!(c.state_label(), "|0⟩");
    }
}
