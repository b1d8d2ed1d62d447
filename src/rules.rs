//! Condition/action rules that attach labels to decoded parameters.
//!
//! A [`Rule`] holds a list of `(path, operator, literal)` conditions and a
//! list of `(path, value)` assignments. When the conditions hold for a
//! record, every assignment is written into it. A [`RuleSet`] runs its rules
//! in order and applies every rule that matches.
//!
//! Rule sets are usually loaded from YAML:
//!
//! ```yaml
//! - name: heart-rate
//!   when:
//!     - [par_udp.parcode, "=", 58]
//!   then:
//!     - ["par_udp.par_val[0]", HR]
//! - name: spo2
//!   conjunction: OR
//!   when:
//!     - [par_udp.parcode, "=", [45, 208]]
//!   then:
//!     - ["par_udp.par_val[0]", SPO2]
//!     - ["par_udp.par_val[1]", PPR]
//! ```

use crate::path::{self, FieldPath, Navigate, Segment, Value};
use crate::protocol::{Frame, Parameter};
use crate::{Error, Result};
use log::{debug, trace, warn};
use std::fmt;
use std::str::FromStr;

/// Comparison of a field against a condition literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub enum Operator {
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Equal,
    #[cfg_attr(feature = "serde", serde(rename = "in"))]
    In,
    #[cfg_attr(feature = "serde", serde(rename = ">"))]
    GreaterThan,
    #[cfg_attr(feature = "serde", serde(rename = "<"))]
    LessThan,
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    GreaterEqual,
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    LessEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::In => "in",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
        }
    }

    /// Compares `value` against `literal`.
    ///
    /// `=` against a set and `in` test membership, `in` against a text
    /// scalar tests for a substring. Ordering never applies to sets.
    pub fn compare(&self, value: &Value, literal: &Literal) -> bool {
        match (self, literal) {
            (Operator::Equal | Operator::In, Literal::Set(items)) => items.contains(value),
            (Operator::Equal, Literal::Scalar(expected)) => value == expected,
            (Operator::In, Literal::Scalar(Value::Text(text))) => {
                value.as_text().is_some_and(|value| text.contains(value))
            }
            (Operator::In, Literal::Scalar(_)) => false,
            (Operator::GreaterThan, Literal::Scalar(expected)) => value > expected,
            (Operator::LessThan, Literal::Scalar(expected)) => value < expected,
            (Operator::GreaterEqual, Literal::Scalar(expected)) => value >= expected,
            (Operator::LessEqual, Literal::Scalar(expected)) => value <= expected,
            (_, Literal::Set(_)) => false,
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "=" => Ok(Operator::Equal),
            "in" => Ok(Operator::In),
            ">" => Ok(Operator::GreaterThan),
            "<" => Ok(Operator::LessThan),
            ">=" => Ok(Operator::GreaterEqual),
            "<=" => Ok(Operator::LessEqual),
            _ => Err(format!("Unsupported comparison '{s}'")),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Literal {
    Set(Vec<Value>),
    Scalar(Value),
}

macro_rules! impl_scalar_literal {
    ($($scalar:ty),*) => {
        $(
            impl From<$scalar> for Literal {
                fn from(value: $scalar) -> Self {
                    Literal::Scalar(value.into())
                }
            }
        )*
    };
}

impl_scalar_literal!(Value, u8, i16, u16, i32, i64, f64, &str, String);

impl<T: Into<Value>, const N: usize> From<[T; N]> for Literal {
    fn from(items: [T; N]) -> Self {
        Literal::Set(items.into_iter().map(Into::into).collect())
    }
}

/// How the results of a rule's conditions are combined.
///
/// Anything other than `AND` combines like `OR`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "String"))]
pub enum Conjunction {
    #[default]
    And,
    Or(String),
}

impl From<String> for Conjunction {
    fn from(value: String) -> Self {
        if value == "AND" {
            Conjunction::And
        } else {
            Conjunction::Or(value)
        }
    }
}

impl From<&str> for Conjunction {
    fn from(value: &str) -> Self {
        Conjunction::from(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(FieldPath, Operator, Literal)"))]
pub struct Condition {
    pub path: FieldPath,
    pub operator: Operator,
    pub literal: Literal,
}

impl Condition {
    pub fn new(path: FieldPath, operator: Operator, literal: impl Into<Literal>) -> Self {
        Condition {
            path,
            operator,
            literal: literal.into(),
        }
    }

    /// Evaluates the condition. A path that does not resolve to a value is
    /// `false`.
    pub fn holds(&self, target: &dyn Navigate) -> bool {
        match path::get(target, &self.path) {
            Ok(value) => self.operator.compare(&value, &self.literal),
            Err(err) => {
                trace!("Condition on {} is false: {err}", self.path);
                false
            }
        }
    }
}

impl From<(FieldPath, Operator, Literal)> for Condition {
    fn from((path, operator, literal): (FieldPath, Operator, Literal)) -> Self {
        Condition {
            path,
            operator,
            literal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "(FieldPath, Value)"))]
pub struct Assignment {
    pub path: FieldPath,
    pub value: Value,
}

impl Assignment {
    pub fn new(path: FieldPath, value: impl Into<Value>) -> Self {
        Assignment {
            path,
            value: value.into(),
        }
    }
}

impl From<(FieldPath, Value)> for Assignment {
    fn from((path, value): (FieldPath, Value)) -> Self {
        Assignment { path, value }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Rule {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conjunction: Conjunction,
    #[cfg_attr(feature = "serde", serde(rename = "when"))]
    pub conditions: Vec<Condition>,
    #[cfg_attr(feature = "serde", serde(rename = "then"))]
    pub actions: Vec<Assignment>,
}

impl Rule {
    pub fn new(conditions: Vec<Condition>, actions: Vec<Assignment>) -> Self {
        Rule {
            name: None,
            conjunction: Conjunction::And,
            conditions,
            actions,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_conjunction(mut self, conjunction: impl Into<Conjunction>) -> Self {
        self.conjunction = conjunction.into();
        self
    }

    /// Evaluates the conditions against `target`.
    ///
    /// Results are checked after every condition: under `AND` the rule fails
    /// as soon as any result so far is false, otherwise it holds as soon as
    /// any result so far is true. Under `AND` this means a leading true
    /// condition decides the rule on its own.
    pub fn evaluate(&self, target: &dyn Navigate) -> bool {
        let mut results = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            results.push(condition.holds(target));
            if self.conjunction == Conjunction::And && !results.iter().all(|holds| *holds) {
                return false;
            }
            if results.iter().any(|holds| *holds) {
                return true;
            }
        }
        match self.conjunction {
            Conjunction::And => results.iter().all(|holds| *holds),
            Conjunction::Or(_) => results.iter().any(|holds| *holds),
        }
    }

    /// Writes every assignment into `target`, stopping at the first one
    /// that fails.
    ///
    /// # Errors
    ///
    /// * [`Error::PathResolution`] if a path does not lead to a writable
    ///   slot.
    /// * [`Error::ValueRejected`] if the slot cannot hold the value.
    pub fn apply(&self, target: &mut dyn Navigate) -> Result<()> {
        for action in &self.actions {
            path::set(target, &action.path, action.value.clone())?;
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => f.write_str("<unnamed>"),
        }
    }
}

/// An ordered list of rules.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Applies every matching rule to `parameter`, in order.
    ///
    /// Returns the number of rules applied. A rule whose assignments fail is
    /// logged and skipped.
    pub fn tag(&self, parameter: &mut Parameter) -> usize {
        let mut applied = 0;
        for rule in &self.rules {
            if !rule.evaluate(&*parameter) {
                continue;
            }
            match rule.apply(parameter) {
                Ok(()) => {
                    trace!("Rule {rule} applied to parcode {}", parameter.par_udp.parcode);
                    applied += 1;
                }
                Err(err) => warn!("Rule {rule} not applied: {err}"),
            }
        }
        applied
    }

    /// Tags every parameter of `frame`. Returns the total number of rules
    /// applied.
    pub fn tag_frame(&self, frame: &mut Frame) -> usize {
        let applied = frame
            .parameters
            .iter_mut()
            .map(|parameter| self.tag(parameter))
            .sum();
        debug!(
            "Applied {applied} rules to {} parameters",
            frame.parameters.len()
        );
        applied
    }

    /// Loads a rule set from a YAML list of rules.
    ///
    /// # Errors
    ///
    /// * [`Error::RuleConfig`] on malformed YAML, an unknown operator or an
    ///   invalid field path.
    #[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
    #[cfg(feature = "serde")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let rules: RuleSet = serde_yaml::from_str(yaml)?;
        debug!("Loaded {} rules", rules.rules.len());
        Ok(rules)
    }

    /// Labels for the value words of the common bedside parameters.
    pub fn bedside_defaults() -> Self {
        const PRESSURES: [u8; 8] = [77, 78, 79, 80, 177, 178, 179, 180];

        let parcode = || par_udp("parcode", None);
        let labels = |labels: &[&str]| -> Vec<Assignment> {
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| Assignment::new(par_udp("par_val", Some(i)), *label))
                .collect()
        };
        let par_type = || FieldPath::from_iter([Segment::new("par_type", None)]);

        RuleSet::new(vec![
            Rule::new(
                vec![Condition::new(parcode(), Operator::Equal, 58u8)],
                labels(&["HR"]),
            )
            .named("heart-rate"),
            Rule::new(
                vec![Condition::new(parcode(), Operator::Equal, 34u8)],
                labels(&["RR"]),
            )
            .named("respiration-rate"),
            Rule::new(
                vec![
                    Condition::new(parcode(), Operator::Equal, PRESSURES),
                    Condition::new(par_type(), Operator::Equal, [2u8, 3, 18]),
                ],
                labels(&["MBP", "SYSBP", "DIABP"]),
            )
            .named("arterial-pressure"),
            Rule::new(
                vec![
                    Condition::new(parcode(), Operator::Equal, PRESSURES),
                    Condition::new(par_type(), Operator::Equal, 6u8),
                ],
                labels(&["MBP", "CPP"]),
            )
            .named("intracranial-pressure"),
            Rule::new(
                vec![Condition::new(parcode(), Operator::Equal, PRESSURES)],
                labels(&["MBP"]),
            )
            .named("mean-pressure"),
            Rule::new(
                vec![Condition::new(parcode(), Operator::Equal, [45u8, 208])],
                labels(&["SPO2", "PPR"]),
            )
            .named("spo2"),
            Rule::new(
                vec![Condition::new(
                    parcode(),
                    Operator::Equal,
                    [35u8, 184, 185, 186, 187],
                )],
                labels(&["T1", "T2"]),
            )
            .named("temperature"),
            Rule::new(
                vec![Condition::new(parcode(), Operator::Equal, [24u8, 124])],
                labels(&["MNIBP", "SYSIBP", "DIAIBP"]),
            )
            .named("nibp"),
        ])
    }
}

fn par_udp(field: &str, index: Option<usize>) -> FieldPath {
    FieldPath::from_iter([Segment::new("par_udp", None), Segment::new(field, index)])
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        RuleSet::new(iter.into_iter().collect())
    }
}

impl FromStr for Condition {
    type Err = Error;

    /// Parses `path operator literal`, e.g. `par_udp.parcode = 58`. The
    /// literal is an integer, a float or bare text.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidCondition(s.to_string());
        let mut parts = s.split_whitespace();
        let (Some(path), Some(operator), Some(literal), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        let operator = operator.parse::<Operator>().map_err(|_| invalid())?;
        let literal = if let Ok(value) = literal.parse::<i64>() {
            Value::Int(value)
        } else if let Ok(value) = literal.parse::<f64>() {
            Value::Float(value)
        } else {
            Value::from(literal)
        };
        Ok(Condition::new(path.parse()?, operator, literal))
    }
}
