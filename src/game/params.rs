//! the fixed table of game types: each names a sampler configuration plus
//! the goal predicates that must hold at termination.

use crate::distribution::{correlations, marginals, CORRELATION_SAMPLES_PRODUCTION};
use crate::error::GameError;
use crate::goal::{GoalProgram, Operator, Token};
use crate::rng::NormalGenerator;
use crate::sampler::SamplerParams;

pub struct GameParams {
    pub sampler: SamplerParams,
    pub marginals: Vec<f64>,
    pub corr: Vec<f64>,
    pub goals: Vec<GoalProgram>,
}

pub(crate) fn game_type_0() -> (SamplerParams, Vec<GoalProgram>) {
    let sampler = SamplerParams::new(2, vec![0.5, 0.2], vec![1.0, 0.0, -1.0, 1.0]).expect("valid sampler params");
    let goals = vec![
        GoalProgram::new(vec![Token::Op(Operator::Ge), Token::AttrRef(0), Token::Literal(600)]),
        GoalProgram::new(vec![Token::Op(Operator::Ge), Token::AttrRef(1), Token::Literal(600)]),
    ];
    (sampler, goals)
}

/// supplemental second ruleset carried over from the original implementation's
/// second scenario: four correlated attributes and goals expressed as
/// attribute-vs-attribute ratios via the `DIV` operator.
fn game_type_1() -> (SamplerParams, Vec<GoalProgram>) {
    let sampler = SamplerParams::new(
        4,
        vec![0.75, 0.2, 0.4, 0.7],
        vec![
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 2.0, -2.0, //
            0.0, 0.0, 1.0, -1.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    )
    .expect("valid sampler params");
    let goals = vec![
        // attr_n[1] >= attr_n[0] / 2
        GoalProgram::new(vec![
            Token::Op(Operator::Ge),
            Token::AttrRef(1),
            Token::Op(Operator::Div),
            Token::AttrRef(0),
            Token::Literal(2),
        ]),
        // attr_n[2] >= attr_n[3] / 2
        GoalProgram::new(vec![
            Token::Op(Operator::Ge),
            Token::AttrRef(2),
            Token::Op(Operator::Div),
            Token::AttrRef(3),
            Token::Literal(2),
        ]),
    ];
    (sampler, goals)
}

pub fn valid_game_type(game_type: i32) -> bool {
    matches!(game_type, 0 | 1)
}

/// build the parameter table, deriving marginals analytically and
/// correlations by Monte Carlo against a freshly seeded generator.
pub fn build_game_params(correlation_samples: usize) -> Vec<GameParams> {
    let rng = NormalGenerator::from_entropy();
    [game_type_0(), game_type_1()]
        .into_iter()
        .map(|(sampler, goals)| {
            let marg = marginals(&sampler);
            let corr = correlations(&sampler, &rng, correlation_samples);
            GameParams {
                sampler,
                marginals: marg,
                corr,
                goals,
            }
        })
        .collect()
}

pub fn build_game_params_production() -> Vec<GameParams> {
    build_game_params(CORRELATION_SAMPLES_PRODUCTION)
}

pub fn get_game_params(table: &[GameParams], game_type: i32) -> Result<&GameParams, GameError> {
    table
        .get(game_type as usize)
        .filter(|_| valid_game_type(game_type))
        .ok_or_else(|| GameError::BadArg("type".into()))
}

#[cfg(test)]
pub(crate) fn game_type_0_for_tests() -> GameParams {
    use crate::distribution::CORRELATION_SAMPLES_TEST;
    let rng = NormalGenerator::from_entropy();
    let (sampler, goals) = game_type_0();
    let marg = marginals(&sampler);
    let corr = correlations(&sampler, &rng, CORRELATION_SAMPLES_TEST);
    GameParams {
        sampler,
        marginals: marg,
        corr,
        goals,
    }
}
