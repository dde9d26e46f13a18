/// A tableau column identity: decision variables come first, then one slack
/// per constraint.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub index: usize,
    pub name: String,
    pub kind: VariableKind,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Decision,
    Slack,
}

impl Variable {
    pub fn decision(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            kind: VariableKind::Decision,
        }
    }

    pub fn slack(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            kind: VariableKind::Slack,
        }
    }

    pub fn is_slack(&self) -> bool {
        self.kind == VariableKind::Slack
    }
}

/// Name for the slack of constraint `row`: `s1`, `s2`, ... with leading
/// underscores added until it no longer collides with a decision variable.
pub(crate) fn slack_name(row: usize, decision_names: &[String]) -> String {
    let mut name = format!("s{}", row + 1);
    while decision_names.iter().any(|n| *n == name) {
        name.insert(0, '_');
    }
    name
}
