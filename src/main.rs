use amber_rain::RainSimulation;

fn main() {
    env_logger::init();

    if let Err(err) = RainSimulation::new().run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
