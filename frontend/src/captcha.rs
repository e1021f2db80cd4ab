use std::fmt;

pub const MIN_OPERAND: u8 = 1;
pub const MAX_OPERAND: u8 = 10;

/// An "a + b" challenge with both operands in 1..=10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Captcha {
    a: u8,
    b: u8,
}

impl Captcha {
    pub fn new(a: u8, b: u8) -> Self {
        Self {
            a: a.clamp(MIN_OPERAND, MAX_OPERAND),
            b: b.clamp(MIN_OPERAND, MAX_OPERAND),
        }
    }

    /// Draws operands from `unit`, a source of floats in `[0, 1)`.
    pub fn draw(mut unit: impl FnMut() -> f64) -> Self {
        let mut operand = || {
            let span = f64::from(MAX_OPERAND - MIN_OPERAND + 1);
            (unit() * span).floor() as u8 + MIN_OPERAND
        };
        let a = operand();
        let b = operand();
        Self::new(a, b)
    }

    /// Draws until the operands differ from this challenge's. The sum may
    /// still repeat.
    pub fn redraw(&self, mut unit: impl FnMut() -> f64) -> Self {
        loop {
            let next = Self::draw(&mut unit);
            if next != *self {
                return next;
            }
        }
    }

    pub fn random() -> Self {
        Self::draw(web_sys::js_sys::Math::random)
    }

    pub fn answer(&self) -> i64 {
        i64::from(self.a) + i64::from(self.b)
    }
}

impl fmt::Display for Captcha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "What is {} + {}?", self.a, self.b)
    }
}
