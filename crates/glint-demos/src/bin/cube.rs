use glint_demos::{CubeConfig, CubeDemo, run_demo};

fn main() -> anyhow::Result<()> {
    run_demo("glint: cube", CubeDemo::new(CubeConfig::default()))
}
