//! Seed data: a small built-in problem set so the service is useful without a catalog file.

use crate::domain::Problem;

fn p(id: &str, topic: &str, difficulty: u8, minutes: u32, text: &str) -> Problem {
  Problem {
    id: id.into(),
    text: text.into(),
    topic: topic.into(),
    difficulty,
    estimated_time_to_solve_minutes: minutes,
  }
}

/// Minimal set of built-in problems covering a few topics and every difficulty level.
pub fn seed_problems() -> Vec<Problem> {
  vec![
    p("alg-001", "Algebra", 1, 2, "Solve for x: x + 7 = 12."),
    p("alg-002", "Algebra", 2, 3, "Solve for x: 3x - 4 = 11."),
    p("alg-003", "Algebra", 3, 5, "Solve the system: x + y = 10, x - y = 2."),
    p("alg-004", "Algebra", 4, 8, "Factor completely: x^3 - 6x^2 + 11x - 6."),
    p("alg-005", "Algebra", 5, 12, "Find all real x with |x^2 - 5x| = 6."),
    p("geo-001", "Geometry", 1, 2, "A square has side 4 cm. What is its area?"),
    p("geo-002", "Geometry", 2, 4, "Find the hypotenuse of a right triangle with legs 6 and 8."),
    p("geo-003", "Geometry", 3, 6, "A circle has circumference 10π. Find its area."),
    p("geo-004", "Geometry", 4, 9, "Prove that the base angles of an isosceles triangle are equal."),
    p("geo-005", "Geometry", 5, 14, "Find the area of a triangle with sides 13, 14 and 15."),
    p("ari-001", "General Math", 1, 1, "Compute 48 ÷ 6."),
    p("ari-002", "General Math", 2, 2, "What is 15% of 80?"),
    p("ari-003", "General Math", 3, 4, "A price rises 20% then falls 20%. What is the net change?"),
    p("ari-004", "General Math", 4, 7, "How many positive divisors does 360 have?"),
    p("ari-005", "General Math", 5, 10, "Find the last two digits of 7^2024."),
  ]
}
