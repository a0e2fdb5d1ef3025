//! Pattern-based solution validator.
//!
//! Submitted code is never executed. Containment rules are checked literally;
//! `output_contains` passes when any expected literal appears in the source and
//! `function_test` passes when the named function is defined or called.
//! A solution is accepted when at least half of its quest's test cases pass.

use serde::Serialize;

use crate::domain::{Quest, TestCase};

/// At most this many failure details are returned to the client.
const MAX_DETAILS: usize = 3;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
  pub passed: bool,
  pub tests_passed: usize,
  pub tests_total: usize,
  pub message: String,
  pub details: Vec<String>,
}

impl ValidationReport {
  /// Submissions that name no quest are not validated.
  pub fn not_requested() -> Self {
    Self { passed: true, tests_passed: 0, tests_total: 0, message: "No validation".into(), details: vec![] }
  }

  pub fn quest_not_found(quest_id: u32) -> Self {
    Self {
      passed: false,
      tests_passed: 0,
      tests_total: 0,
      message: format!("Quest not found: {quest_id}"),
      details: vec![],
    }
  }
}

pub fn validate_solution(code: &str, quest: &Quest) -> ValidationReport {
  let tests_total = quest.test_cases.len();
  if tests_total == 0 {
    return ValidationReport {
      passed: true,
      tests_passed: 0,
      tests_total: 0,
      message: "No test cases defined".into(),
      details: vec![],
    };
  }

  let mut failures: Vec<String> = vec![];
  for tc in &quest.test_cases {
    if let Err(e) = check(code, tc) {
      failures.push(e);
    }
  }
  let tests_passed = tests_total - failures.len();
  let passed = tests_passed * 2 >= tests_total;

  let message = if passed {
    "Solution accepted!".to_string()
  } else {
    format!("Solution failed: {}", failures.first().map(String::as_str).unwrap_or("Unknown error"))
  };
  failures.truncate(MAX_DETAILS);

  ValidationReport {
    passed,
    tests_passed,
    tests_total,
    message,
    details: if passed { vec![] } else { failures },
  }
}

fn check(code: &str, tc: &TestCase) -> Result<(), String> {
  match tc {
    TestCase::CodeContains { expected } => {
      let missing: Vec<&str> = expected.iter().map(String::as_str).filter(|p| !code.contains(*p)).collect();
      if missing.is_empty() { Ok(()) } else { Err(format!("Missing required code: {missing:?}")) }
    }
    TestCase::CodeNotContains { expected } => {
      let found: Vec<&str> = expected.iter().map(String::as_str).filter(|p| code.contains(*p)).collect();
      if found.is_empty() { Ok(()) } else { Err(format!("Forbidden code found: {found:?}")) }
    }
    TestCase::CodeContainsAny { expected } => {
      if expected.iter().any(|p| code.contains(p.as_str())) {
        Ok(())
      } else {
        Err(format!("Missing at least one of: {expected:?}"))
      }
    }
    TestCase::OutputContains { expected } => {
      if expected.iter().any(|p| code.contains(p.as_str())) {
        Ok(())
      } else {
        Err(format!("Expected output not produced: {expected:?}"))
      }
    }
    TestCase::FunctionTest { function, .. } => {
      if function_name_variants(function).iter().any(|name| code.contains(&format!("{name}("))) {
        Ok(())
      } else {
        Err(format!("Function '{function}' not found"))
      }
    }
    TestCase::CodeLineCount { max_lines } => {
      let lines = code
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
        .count();
      if lines <= *max_lines { Ok(()) } else { Err(format!("Too many lines: {lines} > {max_lines}")) }
    }
    TestCase::CodeCount { pattern, min_count } => {
      let count = if pattern.is_empty() { 0 } else { code.matches(pattern.as_str()).count() };
      if count >= *min_count {
        Ok(())
      } else {
        Err(format!("Pattern '{pattern}' found {count} times, need at least {min_count}"))
      }
    }
  }
}

/// `find_max` may be written `find_max`, `findmax` or `findMax` depending on the language.
fn function_name_variants(name: &str) -> Vec<String> {
  let mut camel = String::with_capacity(name.len());
  let mut upper_next = false;
  for ch in name.chars() {
    if ch == '_' {
      upper_next = true;
    } else if upper_next {
      camel.extend(ch.to_uppercase());
      upper_next = false;
    } else {
      camel.push(ch);
    }
  }
  let mut out = vec![name.to_string(), name.replace('_', ""), name.to_lowercase(), camel];
  out.dedup();
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::SkillLevel;

  fn quest(test_cases: Vec<TestCase>) -> Quest {
    Quest {
      id: 1,
      language: "python".into(),
      level: SkillLevel::Beginner,
      title: "t".into(),
      task: "t".into(),
      xp: 10,
      test_cases,
    }
  }

  fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
  }

  #[test]
  fn accepts_matching_solution() {
    let q = quest(vec![
      TestCase::FunctionTest { function: "sum_calculator".into(), inputs: vec![], expected: vec![] },
      TestCase::CodeContains { expected: strings(&["def", "return"]) },
    ]);
    let r = validate_solution("def sum_calculator(a, b):\n    return a + b\n", &q);
    assert!(r.passed);
    assert_eq!((r.tests_passed, r.tests_total), (2, 2));
    assert_eq!(r.message, "Solution accepted!");
    assert!(r.details.is_empty());
  }

  #[test]
  fn half_passing_is_enough() {
    let q = quest(vec![
      TestCase::FunctionTest { function: "reverse_string".into(), inputs: vec![], expected: vec![] },
      TestCase::CodeNotContains { expected: strings(&["[::-1]", ".reverse()"]) },
    ]);
    let r = validate_solution("def reverse_string(s):\n    return s[::-1]", &q);
    assert!(r.passed);
    assert_eq!(r.tests_passed, 1);
  }

  #[test]
  fn failure_reports_first_problem_and_caps_details() {
    let q = quest(vec![
      TestCase::CodeContains { expected: strings(&["class"]) },
      TestCase::CodeContains { expected: strings(&["__enter__"]) },
      TestCase::CodeContains { expected: strings(&["__exit__"]) },
      TestCase::CodeContains { expected: strings(&["with"]) },
    ]);
    let r = validate_solution("print('hi')", &q);
    assert!(!r.passed);
    assert_eq!(r.tests_passed, 0);
    assert_eq!(r.message, r#"Solution failed: Missing required code: ["class"]"#);
    assert_eq!(r.details.len(), 3);
  }

  #[test]
  fn camel_case_function_names_match() {
    let q = quest(vec![TestCase::FunctionTest { function: "find_max".into(), inputs: vec![], expected: vec![] }]);
    assert!(validate_solution("function findMax(xs) { return 0; }", &q).passed);
    assert!(!validate_solution("function biggest(xs) { return 0; }", &q).passed);
  }

  #[test]
  fn line_and_pattern_counts() {
    let q = quest(vec![TestCase::CodeLineCount { max_lines: 2 }]);
    assert!(validate_solution("# comment\nx = [s.upper() for s in xs]\n\nprint(x)\n", &q).passed);
    assert!(!validate_solution("a = 1\nb = 2\nc = 3\n", &q).passed);

    let q = quest(vec![TestCase::CodeCount { pattern: "yield".into(), min_count: 2 }]);
    assert!(validate_solution("def a():\n  yield 1\n  yield 2", &q).passed);
    let r = validate_solution("def a():\n  yield 1", &q);
    assert_eq!(r.details, vec!["Pattern 'yield' found 1 times, need at least 2".to_string()]);
  }

  #[test]
  fn output_literals_are_looked_up_in_source() {
    let q = quest(vec![TestCase::OutputContains { expected: strings(&["Fizz", "Buzz"]) }]);
    assert!(validate_solution("print('Fizz')", &q).passed);
    assert!(!validate_solution("print(i)", &q).passed);
  }

  #[test]
  fn quest_without_cases_passes() {
    let r = validate_solution("", &quest(vec![]));
    assert!(r.passed);
    assert_eq!(r.message, "No test cases defined");
  }
}
