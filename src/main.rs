use EsterPFR::ReactorsPDE::RealPFR::{RealPFR, ReactorError};
use EsterPFR::ReactorsPDE::pfr_config::ReactorTask;
use EsterPFR::ReactorsPDE::simulation_trace::StateVariable;
use EsterPFR::Utils::logger::{init_logger, level_from_env};
use log::{error, info};

fn run_task(task: ReactorTask) -> Result<(), ReactorError> {
    let reactor = RealPFR::from_configuration(
        task.configuration.clone(),
        task.constants(),
        task.settings.clone(),
    )?;
    reactor.pretty_print_task();
    let trace = reactor.run(task.time_step, task.time_end)?;
    let last = trace.len() - 1;
    let mean_t = reactor.flow_averaged_profile(&trace, last, StateVariable::Temperature)?;
    let mean_x = reactor.flow_averaged_profile(&trace, last, StateVariable::Conversion)?;
    for (i, z) in reactor.grid.z.iter().enumerate().step_by(10) {
        info!("z = {:.2} m: T = {:.2} K, X = {:.4}", z, mean_t[i], mean_x[i]);
    }
    let outlet = reactor.outlet_summary(&trace, last)?;
    outlet.pretty_print();
    let money = reactor.economics(&outlet);
    info!(
        "IPP value {:.2} USD/min, IPA {:.2} USD/min, PTSA {:.2} USD/min, vessel {:.0} USD",
        money.product_value, money.ipa_cost, money.catalyst_cost, money.reactor_cost
    );
    let balance = reactor.limiting_reactant_balance(&trace, last)?;
    info!("palmitic acid balance residual {:.3e}", balance.relative_residual());
    Ok(())
}

pub fn main() {
    init_logger(level_from_env());
    let task = match std::env::args().nth(1) {
        Some(path) => match ReactorTask::load_from_file(&path) {
            Ok(task) => task,
            Err(e) => {
                error!("cannot load task {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ReactorTask::default(),
    };
    if let Err(e) = run_task(task) {
        error!("{}", e);
        std::process::exit(1);
    }
}
