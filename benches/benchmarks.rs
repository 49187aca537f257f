criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        drawing_well1024a_word,
        drawing_normal_pair,
        sampling_attributes,
        evaluating_goal_program,
        estimating_correlations,
}

use berghain::distribution::{correlations, CORRELATION_SAMPLES_TEST};
use berghain::goal::{GoalProgram, Operator, Token};
use berghain::rng::{NormalGenerator, Well1024a};
use berghain::sampler::{generate_attributes, SamplerParams};

fn params() -> SamplerParams {
    SamplerParams::new(2, vec![0.5, 0.2], vec![1.0, 0.0, -1.0, 1.0]).expect("valid sampler params")
}

fn drawing_well1024a_word(c: &mut criterion::Criterion) {
    let mut well = Well1024a::seeded([0x1234_5678u32; 32]);
    c.bench_function("draw a WELL-1024a word", |b| b.iter(|| well.next_u32()));
}

fn drawing_normal_pair(c: &mut criterion::Criterion) {
    let gen = NormalGenerator::new(Well1024a::seeded([0xabcd_ef01u32; 32]));
    c.bench_function("draw a Box-Muller normal pair", |b| b.iter(|| gen.get_normals()));
}

fn sampling_attributes(c: &mut criterion::Criterion) {
    let gen = NormalGenerator::new(Well1024a::seeded([42u32; 32]));
    let params = params();
    c.bench_function("sample one attribute bitmask", |b| {
        b.iter(|| generate_attributes(&gen, &params))
    });
}

fn evaluating_goal_program(c: &mut criterion::Criterion) {
    let program = GoalProgram::new(vec![
        Token::Op(Operator::Plus),
        Token::Literal(4),
        Token::Op(Operator::Mult),
        Token::Literal(2),
        Token::Op(Operator::Plus),
        Token::Literal(-10),
        Token::Literal(13),
    ]);
    c.bench_function("evaluate a postfix goal program", |b| {
        b.iter(|| program.evaluate(&[]))
    });
}

fn estimating_correlations(c: &mut criterion::Criterion) {
    let gen = NormalGenerator::new(Well1024a::seeded([7u32; 32]));
    let params = params();
    c.bench_function("estimate a correlation matrix (test sample count)", |b| {
        b.iter(|| correlations(&params, &gen, CORRELATION_SAMPLES_TEST))
    });
}
