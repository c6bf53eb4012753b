use dp_clustering::{
    CalculatorConfig, CompositionRule, DifferentialPrivacyParam, GaussianCalibration,
    PrivacyBudgetSplit, PrivacyCalculator,
};
use tracing_subscriber::EnvFilter;

fn main() -> dp_clustering::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let privacy_param = DifferentialPrivacyParam::new(1.0, 1e-6)?;
    let split = PrivacyBudgetSplit::new(0.8, 0.2)?;
    let radius = 1.0;

    let configs = [
        ("sequential/analytic", CalculatorConfig::default()),
        (
            "sequential/classical",
            CalculatorConfig::default().with_calibration(GaussianCalibration::Classical),
        ),
        (
            "advanced/analytic",
            CalculatorConfig::default()
                .with_composition(CompositionRule::Advanced { slack_frac: 0.5 }),
        ),
    ];

    for max_depth in [1usize, 4, 20, 100] {
        for (name, config) in &configs {
            let pcalc = PrivacyCalculator::from_budget_split_with_config(
                &privacy_param,
                &split,
                radius,
                max_depth,
                config,
            )?;
            println!(
                "depth={max_depth:>3} {name:<22} std_dev={:>10.4} laplace={:>10.4}",
                pcalc.gaussian_std_dev(),
                pcalc.laplace_param()
            );
        }
    }
    Ok(())
}
