use epinet::runner::run_with_args;

fn main() {
    if let Err(e) = run_with_args(|_, _| Ok(())) {
        eprintln!("epinet: {e}");
        std::process::exit(1);
    }
}
