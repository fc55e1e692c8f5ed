use codalign::gen_seq;
use codalign::{AlignConfig, GapModel, MarginalModel, Mode};
use rand::SeedableRng;
// Usage: benchmark <codons> <seed> <pairs> <error rate>
fn main() {
    env_logger::init();
    let args: Vec<_> = std::env::args().collect();
    let parse = |i: usize, default: &str| -> String {
        args.get(i).cloned().unwrap_or_else(|| default.to_string())
    };
    let len: usize = parse(1, "300").parse().unwrap();
    let seed: u64 = parse(2, "4234").parse().unwrap();
    let num: usize = parse(3, "20").parse().unwrap();
    let error_rate: f64 = parse(4, "0.1").parse().unwrap();
    let mut rng: rand_xoshiro::Xoroshiro128PlusPlus = SeedableRng::seed_from_u64(seed);
    let prof = gen_seq::PROFILE.norm().mul(error_rate);
    let pairs: Vec<_> = (0..num)
        .map(|_| {
            let template = gen_seq::generate_coding_seq(&mut rng, len);
            let query = gen_seq::introduce_codon_indels(&template, &mut rng, &prof);
            (template, query)
        })
        .collect();
    let model = MarginalModel::mg94(codalign::codon::DEFAULT_BRANCH_LENGTH);
    for &mode in &[Mode::Marginal, Mode::FramePreserving] {
        let config = AlignConfig::new(GapModel::default(), mode);
        let start = std::time::Instant::now();
        let weight: f64 = pairs
            .iter()
            .map(|(xs, ys)| codalign::align_with(xs, ys, &model, &config).unwrap().weight)
            .sum();
        let time = (std::time::Instant::now() - start).as_millis();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.3}\t{}",
            len, seed, num, error_rate, time, weight, mode
        );
        let start = std::time::Instant::now();
        let alns = codalign::align_batch(&pairs, &model, &config);
        let time = (std::time::Instant::now() - start).as_millis();
        let weight: f64 = alns.iter().map(|aln| aln.as_ref().unwrap().weight).sum();
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.3}\t{}-batch(step={})",
            len,
            seed,
            num,
            error_rate,
            time,
            weight,
            mode,
            mode.step()
        );
    }
}
