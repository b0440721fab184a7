use anyhow::Result;
use turco::utils::logging;
use turco::{Command, Config, PublishOptions, Turco};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let command: Command = config.command.parse()?;
    let options = PublishOptions {
        block_by_same_name: config.block_by_same_name,
        alter_names: config.alter_names,
        precise: None,
    };

    // 初始化并运行
    Turco::initialize(&config).await?.run(command, &options).await?;

    Ok(())
}
