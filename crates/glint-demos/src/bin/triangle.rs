use glint_demos::{FlatDemo, run_demo};

fn main() -> anyhow::Result<()> {
    run_demo("glint: triangle", FlatDemo::triangle())
}
