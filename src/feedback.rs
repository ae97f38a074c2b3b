use std::fmt::Display;

use crate::errors::DebuggerError;
use crate::load::LoadPlan;

#[derive(Debug)]
pub enum Feedback {
    Ok,
    Text(String),
    Plan(LoadPlan),
    Error(DebuggerError),
}

impl Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feedback::Ok => write!(f, "Ok")?,
            Feedback::Error(e) => write!(f, "Error: {e}")?,
            Feedback::Text(t) => write!(f, "{t}")?,
            Feedback::Plan(plan) => {
                write!(f, "loaded {} at {}", plan.binary_path.display(), plan.base)?;
                for command in &plan.commands {
                    write!(f, "\n{command}")?;
                }
            }
        }

        Ok(())
    }
}

impl From<Result<Feedback, DebuggerError>> for Feedback {
    fn from(value: Result<Feedback, DebuggerError>) -> Self {
        match value {
            Ok(f) => f,
            Err(e) => Feedback::Error(e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_feedback_from_result() {
        let f: Feedback = Err(DebuggerError::InvalidRegister("xmm0".to_string())).into();
        assert_eq!(format!("{f}"), "Error: invalid register 'xmm0'");
    }
}
