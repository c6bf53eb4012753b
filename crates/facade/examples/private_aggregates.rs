use dp_clustering::test_utils::{test_coreset_param, TestCoresetConfig};
use dp_clustering::{private_average, private_count};
use ndarray::Array2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> dp_clustering::Result<()> {
    let param = test_coreset_param(
        &TestCoresetConfig::default()
            .with_budget(10.0, 1e-6)
            .with_split(0.5, 0.5),
    )?;
    let pcalc = param.pcalc();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let points = Array2::from_shape_fn((1_000, 2), |(i, j)| {
        let t = i as f64 / 1_000.0;
        if j == 0 {
            t.cos() * 0.5
        } else {
            t.sin() * 0.5
        }
    });

    let count = private_count(points.nrows() as u64, pcalc.count_privacy_param(), &mut rng);
    println!("true count: {}, private count: {count}", points.nrows());
    if count > 0 {
        let avg = private_average(points.view(), count, pcalc.average_privacy_param(), &mut rng)?;
        println!("private average: {avg}");
    }
    Ok(())
}
