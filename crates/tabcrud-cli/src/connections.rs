use crate::cli::ConnectionsArgs;
use crate::config::Settings;
use crate::render::new_table;

pub fn run(args: ConnectionsArgs) -> anyhow::Result<()> {
    let settings = Settings::load(args.config)?;

    // URLs may carry credentials and are never printed.
    let mut table = new_table(&["Name", "Dialect", "Database", "Schema", "Pool"]);
    for c in &settings.file.connections {
        table.add_row(vec![
            c.name.clone(),
            c.dialect.to_string(),
            c.database.clone().unwrap_or_default(),
            c.schema.clone().unwrap_or_default(),
            c.max_pool_size.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
