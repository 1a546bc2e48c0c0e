//! Named boolean checks that drive conditional quest objectives.
//!
//! A character carries several [`PredicateEvaluator`]s (its trait allocator,
//! its quest tracker, anything else the host adds). Each one claims the
//! predicate names it understands and answers `None` for the rest, so an
//! [`EvaluatorChain`] can ask them in order and take the first definite
//! answer.
//!
//! Objectives reference a [`Condition`]: every disjunction in it must have
//! at least one satisfied [`Predicate`].

use serde::{Deserialize, Serialize};

use crate::error::{ProgressionError, Result};

/// Capability to answer named boolean queries.
pub trait PredicateEvaluator {
    /// Evaluate `predicate` with `parameters`.
    ///
    /// - `Ok(Some(b))`: this evaluator owns the predicate and the answer is `b`.
    /// - `Ok(None)`: not handled here; ask someone else.
    /// - `Err(_)`: this evaluator owns the predicate but the input is unusable.
    ///
    /// # Errors
    /// Implementation-defined; see each evaluator.
    fn evaluate(&self, predicate: &str, parameters: &[String]) -> Result<Option<bool>>;
}

/// Fetch parameter `index`, or report it missing for `predicate`.
///
/// # Errors
/// Returns [`ProgressionError::MissingPredicateParameter`] if absent.
pub fn parameter<'a>(predicate: &str, parameters: &'a [String], index: usize) -> Result<&'a str> {
    parameters
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| ProgressionError::MissingPredicateParameter {
            predicate: predicate.to_string(),
            index,
        })
}

/// Ordered set of evaluators consulted first-definite-answer-wins.
#[derive(Default)]
pub struct EvaluatorChain<'a> {
    evaluators: Vec<&'a dyn PredicateEvaluator>,
}

impl<'a> EvaluatorChain<'a> {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self { evaluators: Vec::new() }
    }

    /// Append an evaluator; earlier evaluators take precedence.
    #[must_use]
    pub fn with(mut self, evaluator: &'a dyn PredicateEvaluator) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    /// Append an evaluator in place.
    pub fn push(&mut self, evaluator: &'a dyn PredicateEvaluator) {
        self.evaluators.push(evaluator);
    }

    /// Number of evaluators in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }
}

impl PredicateEvaluator for EvaluatorChain<'_> {
    fn evaluate(&self, predicate: &str, parameters: &[String]) -> Result<Option<bool>> {
        for evaluator in &self.evaluators {
            if let Some(answer) = evaluator.evaluate(predicate, parameters)? {
                return Ok(Some(answer));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for EvaluatorChain<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorChain")
            .field("evaluators", &self.evaluators.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// A single named check, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// Predicate name, e.g. `"MinimumTrait"`.
    pub name: String,
    /// Positional string parameters.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Invert a definite answer.
    #[serde(default)]
    pub negate: bool,
}

impl Predicate {
    /// Build a non-negated predicate.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
            negate: false,
        }
    }

    /// Invert this predicate.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Whether the predicate holds. A predicate no evaluator handles never
    /// holds, negated or not.
    ///
    /// # Errors
    /// Propagates the first evaluator error.
    pub fn check(&self, evaluator: &dyn PredicateEvaluator) -> Result<bool> {
        Ok(evaluator
            .evaluate(&self.name, &self.parameters)?
            .is_some_and(|answer| answer != self.negate))
    }
}

/// Any-of group inside a [`Condition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disjunction {
    /// Alternatives; at least one must hold.
    pub any: Vec<Predicate>,
}

/// All-of list of [`Disjunction`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Groups that must all hold.
    pub all: Vec<Disjunction>,
}

impl Condition {
    /// A condition consisting of exactly one predicate.
    #[must_use]
    pub fn single(predicate: Predicate) -> Self {
        Self {
            all: vec![Disjunction { any: vec![predicate] }],
        }
    }

    /// Add another required predicate.
    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.all.push(Disjunction { any: vec![predicate] });
        self
    }

    /// Add an alternative to the most recently added group.
    #[must_use]
    pub fn or(mut self, predicate: Predicate) -> Self {
        match self.all.last_mut() {
            Some(group) => group.any.push(predicate),
            None => self.all.push(Disjunction { any: vec![predicate] }),
        }
        self
    }

    /// Evaluate the condition against `evaluator`.
    ///
    /// # Errors
    /// Propagates the first evaluator error.
    pub fn check(&self, evaluator: &dyn PredicateEvaluator) -> Result<bool> {
        for group in &self.all {
            let mut satisfied = false;
            for predicate in &group.any {
                if predicate.check(evaluator)? {
                    satisfied = true;
                    break;
                }
            }
            if !satisfied {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers `Flag <name>` from a fixed list; everything else is unhandled.
    struct Flags(Vec<&'static str>);

    impl PredicateEvaluator for Flags {
        fn evaluate(&self, predicate: &str, parameters: &[String]) -> Result<Option<bool>> {
            if predicate != "Flag" {
                return Ok(None);
            }
            let name = parameter(predicate, parameters, 0)?;
            Ok(Some(self.0.iter().any(|flag| *flag == name)))
        }
    }

    struct Always(Option<bool>);

    impl PredicateEvaluator for Always {
        fn evaluate(&self, _predicate: &str, _parameters: &[String]) -> Result<Option<bool>> {
            Ok(self.0)
        }
    }

    #[test]
    fn chain_first_definite_answer_wins() {
        let unhandled = Always(None);
        let no = Always(Some(false));
        let yes = Always(Some(true));
        let chain = EvaluatorChain::new().with(&unhandled).with(&no).with(&yes);
        assert_eq!(chain.evaluate("Anything", &[]).expect("eval"), Some(false));
    }

    #[test]
    fn chain_all_unhandled_is_none() {
        let unhandled = Always(None);
        let chain = EvaluatorChain::new().with(&unhandled);
        assert_eq!(chain.evaluate("Anything", &[]).expect("eval"), None);
        assert!(!Predicate::new("Anything", Vec::<String>::new()).check(&chain).expect("check"));
        assert!(
            !Predicate::new("Anything", Vec::<String>::new())
                .negated()
                .check(&chain)
                .expect("check")
        );
    }

    #[test]
    fn negation_flips_definite_answers() {
        let flags = Flags(vec!["door_open"]);
        let open = Predicate::new("Flag", ["door_open"]);
        assert!(open.check(&flags).expect("check"));
        assert!(!open.clone().negated().check(&flags).expect("check"));
    }

    #[test]
    fn condition_is_and_of_ors() {
        let flags = Flags(vec!["a", "c"]);
        let cond = Condition::single(Predicate::new("Flag", ["a"]))
            .and(Predicate::new("Flag", ["b"]))
            .or(Predicate::new("Flag", ["c"]));
        assert!(cond.check(&flags).expect("check"));

        let cond = cond.and(Predicate::new("Flag", ["d"]));
        assert!(!cond.check(&flags).expect("check"));
    }

    #[test]
    fn empty_condition_holds() {
        let flags = Flags(vec![]);
        assert!(Condition::default().check(&flags).expect("check"));
    }

    #[test]
    fn missing_parameter_is_an_error() {
        let flags = Flags(vec![]);
        let err = Predicate::new("Flag", Vec::<String>::new())
            .check(&flags)
            .expect_err("missing parameter");
        assert!(matches!(err, ProgressionError::MissingPredicateParameter { index: 0, .. }));
    }
}
