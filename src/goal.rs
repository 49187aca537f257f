//! packed postfix goal expression engine: a tiny stack machine evaluated
//! over a game's live attribute counters.

use crate::error::GameError;

pub const LITERAL_MIN: i32 = -2048;
pub const LITERAL_MAX: i32 = 2047;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
    Div,
    Mult,
    Lt,
    Ge,
}

impl Operator {
    fn apply(self, a: i32, b: i32) -> Result<i32, GameError> {
        match self {
            Self::Plus => Ok(a.wrapping_add(b)),
            Self::Minus => Ok(a.wrapping_sub(b)),
            Self::Div => {
                if b == 0 {
                    Err(GameError::BadGoalProgram("division by zero".into()))
                } else {
                    Ok(a.wrapping_div(b))
                }
            }
            Self::Mult => Ok(a.wrapping_mul(b)),
            Self::Lt => Ok((a < b) as i32),
            Self::Ge => Ok((a >= b) as i32),
        }
    }
}

/// a single token in a goal program, in tagged-variant form (the packed
/// `TAIL`/`OPER`/`ATTR` bitfields of the wire format collapse to this once
/// decoded; see [`Token::encode`]/[`Token::decode`] for the wire mapping).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Op(Operator),
    AttrRef(usize),
    Literal(i32),
}

const TAIL_BIT: u32 = 1 << 14;
const OPER_BIT: u32 = 1 << 13;
const ATTR_BIT: u32 = 1 << 12;
const VALUE_MASK: u32 = 0x0fff;

impl Token {
    pub fn encode(self) -> u32 {
        match self {
            Token::Op(op) => {
                let code = match op {
                    Operator::Plus => 0,
                    Operator::Minus => 1,
                    Operator::Div => 2,
                    Operator::Mult => 3,
                    Operator::Lt => 4,
                    Operator::Ge => 5,
                };
                OPER_BIT | code
            }
            Token::AttrRef(k) => ATTR_BIT | (k as u32 & VALUE_MASK),
            Token::Literal(v) => (v as u32) & VALUE_MASK,
        }
    }

    pub fn decode(word: u32) -> Result<Token, GameError> {
        if word & OPER_BIT != 0 {
            let op = match word & 0b111 {
                0 => Operator::Plus,
                1 => Operator::Minus,
                2 => Operator::Div,
                3 => Operator::Mult,
                4 => Operator::Lt,
                5 => Operator::Ge,
                other => return Err(GameError::BadGoalProgram(format!("bad op code {}", other))),
            };
            return Ok(Token::Op(op));
        }
        if word & ATTR_BIT != 0 {
            return Ok(Token::AttrRef((word & VALUE_MASK) as usize));
        }
        Ok(Token::Literal(sign_extend_12(word & VALUE_MASK)))
    }

    fn is_operator(&self) -> bool {
        matches!(self, Token::Op(_))
    }
}

fn sign_extend_12(value: u32) -> i32 {
    let shifted = (value << 20) as i32;
    shifted >> 20
}

/// a goal program: a tail-terminated sequence of tokens in postfix order.
#[derive(Debug, Clone)]
pub struct GoalProgram {
    tokens: Vec<Token>,
}

impl GoalProgram {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// packed `u32` word sequence, TAIL-terminated, matching the wire format.
    pub fn from_words(words: &[u32]) -> Result<Self, GameError> {
        let mut tokens = Vec::with_capacity(words.len());
        for &word in words {
            if word & TAIL_BIT != 0 {
                break;
            }
            tokens.push(Token::decode(word)?);
        }
        Ok(Self { tokens })
    }

    /// evaluate against `attr_n`, returning the final 32-bit integer result.
    pub fn evaluate(&self, attr_n: &[u32]) -> Result<i32, GameError> {
        let mut stack: Vec<Token> = Vec::with_capacity(self.tokens.len());
        let mut input = self.tokens.iter().copied();
        let mut next = input.next();

        loop {
            if stack.len() >= 3 {
                let top3 = &stack[stack.len() - 3..];
                if top3[0].is_operator() && !top3[1].is_operator() && !top3[2].is_operator() {
                    let op = match top3[0] {
                        Token::Op(op) => op,
                        _ => unreachable!(),
                    };
                    let a = decode_value(top3[1], attr_n)?;
                    let b = decode_value(top3[2], attr_n)?;
                    let result = op.apply(a, b)?;
                    stack.truncate(stack.len() - 3);
                    stack.push(Token::Literal(result));
                    continue;
                }
            }
            match next {
                Some(token) => {
                    stack.push(token);
                    next = input.next();
                }
                None => break,
            }
        }

        if stack.len() != 1 {
            return Err(GameError::BadGoalProgram(format!(
                "evaluation terminated with {} stack entries",
                stack.len()
            )));
        }
        decode_value(stack[0], attr_n)
    }

    /// if this program has the shape `attr_n[k] >= literal`, return `(k,
    /// literal)`; used by the bouncer client, whose admission policy only
    /// models simple per-attribute quota goals (see the client-side state
    /// in the data model), not arbitrary predicates.
    pub fn as_simple_quota(&self) -> Option<(usize, i64)> {
        match self.tokens.as_slice() {
            [Token::Op(Operator::Ge), Token::AttrRef(k), Token::Literal(n)] => Some((*k, *n as i64)),
            _ => None,
        }
    }

    /// re-encode to the TAIL-terminated packed wire format.
    pub fn to_words(&self) -> Vec<u32> {
        let mut words: Vec<u32> = self.tokens.iter().map(|t| t.encode()).collect();
        words.push(TAIL_BIT);
        words
    }

    /// true iff the program's final result is non-zero.
    pub fn is_satisfied(&self, attr_n: &[u32]) -> bool {
        match self.evaluate(attr_n) {
            Ok(v) => v != 0,
            Err(_) => false,
        }
    }
}

fn decode_value(token: Token, attr_n: &[u32]) -> Result<i32, GameError> {
    match token {
        Token::Literal(v) => Ok(v),
        Token::AttrRef(k) => attr_n
            .get(k)
            .map(|&n| n as i32)
            .ok_or_else(|| GameError::BadGoalProgram(format!("unknown attribute {}", k))),
        Token::Op(_) => Err(GameError::BadGoalProgram("expected value, found operator".into())),
    }
}

/// evaluate every goal in `goals`; satisfied iff every predicate is non-zero.
pub fn check_goals(goals: &[GoalProgram], attr_n: &[u32]) -> bool {
    goals.iter().all(|g| g.is_satisfied(attr_n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_reference_roundtrip_example_ten() {
        // [PLUS, 4, MULT, 2, PLUS, -10, 13] -> 10
        let program = GoalProgram::new(vec![
            Token::Op(Operator::Plus),
            Token::Literal(4),
            Token::Op(Operator::Mult),
            Token::Literal(2),
            Token::Op(Operator::Plus),
            Token::Literal(-10),
            Token::Literal(13),
        ]);
        assert_eq!(program.evaluate(&[]).unwrap(), 10);
    }

    #[test]
    fn decodes_from_packed_words() {
        let words = [
            Token::Op(Operator::Plus).encode(),
            Token::Literal(4).encode(),
            Token::Op(Operator::Mult).encode(),
            Token::Literal(2).encode(),
            Token::Op(Operator::Plus).encode(),
            Token::Literal(-10).encode(),
            Token::Literal(13).encode(),
            TAIL_BIT,
        ];
        let program = GoalProgram::from_words(&words).unwrap();
        assert_eq!(program.evaluate(&[]).unwrap(), 10);
    }

    #[test]
    fn sign_extends_negative_literals() {
        let encoded = Token::Literal(-1).encode();
        assert_eq!(Token::decode(encoded).unwrap(), Token::Literal(-1));
        let encoded = Token::Literal(-2048).encode();
        assert_eq!(Token::decode(encoded).unwrap(), Token::Literal(-2048));
    }

    #[test]
    fn references_live_attribute_counters() {
        // attr_n[1] >= 5
        let program = GoalProgram::new(vec![
            Token::Op(Operator::Ge),
            Token::AttrRef(1),
            Token::Literal(5),
        ]);
        assert!(program.is_satisfied(&[0, 5]));
        assert!(!program.is_satisfied(&[0, 4]));
    }

    #[test]
    fn goal_set_requires_all_predicates() {
        let a = GoalProgram::new(vec![Token::Op(Operator::Ge), Token::AttrRef(0), Token::Literal(1)]);
        let b = GoalProgram::new(vec![Token::Op(Operator::Ge), Token::AttrRef(1), Token::Literal(1)]);
        assert!(!check_goals(&[a.clone(), b.clone()], &[1, 0]));
        assert!(check_goals(&[a, b], &[1, 1]));
    }

    #[test]
    fn recognizes_simple_quota_shape() {
        let quota = GoalProgram::new(vec![Token::Op(Operator::Ge), Token::AttrRef(0), Token::Literal(600)]);
        assert_eq!(quota.as_simple_quota(), Some((0, 600)));

        let ratio = GoalProgram::new(vec![
            Token::Op(Operator::Ge),
            Token::AttrRef(1),
            Token::Op(Operator::Div),
            Token::AttrRef(0),
            Token::Literal(2),
        ]);
        assert_eq!(ratio.as_simple_quota(), None);
    }

    #[test]
    fn to_words_roundtrips_through_from_words() {
        let program = GoalProgram::new(vec![
            Token::Op(Operator::Ge),
            Token::AttrRef(1),
            Token::Literal(-5),
        ]);
        let words = program.to_words();
        let decoded = GoalProgram::from_words(&words).unwrap();
        assert_eq!(program.evaluate(&[0, 10]).unwrap(), decoded.evaluate(&[0, 10]).unwrap());
    }

    #[test]
    fn division_by_zero_is_a_bad_program_not_a_panic() {
        let program = GoalProgram::new(vec![
            Token::Op(Operator::Div),
            Token::Literal(4),
            Token::Literal(0),
        ]);
        assert!(program.evaluate(&[]).is_err());
        assert!(!program.is_satisfied(&[]));
    }
}
