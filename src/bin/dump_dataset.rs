use terra_dataaccess::{DataSet, GpkgDataSource, Record, Value, logging};

fn main() {
    if let Err(err) = run() {
        eprintln!("dump_dataset failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("Usage: dump_dataset <path-to-gpkg> [layer]")?;
    let layer = args.next();
    logging::init_logger(std::env::var_os("VERBOSE").is_some());

    let source = GpkgDataSource::open_read_only(&path)?;
    let Some(layer) = layer else {
        for name in source.list_datasets()? {
            let info = source.layer_info(&name)?;
            println!(
                "{name}: {} properties, geometry={} srs_id={}",
                info.schema.len(),
                info.geometry_column,
                info.srs_id
            );
        }
        return Ok(());
    };

    let mut dataset = source.get_dataset(&layer)?;
    let header: Vec<String> = dataset
        .schema()
        .columns()
        .iter()
        .map(|c| format!("{}:{}", c.name, c.data_type.name()))
        .collect();
    println!("layer: {layer} ({})", header.join(", "));

    let mut row = 0;
    while dataset.move_next() {
        let mut values = Vec::with_capacity(dataset.schema().len());
        for (i, column) in dataset.schema().columns().iter().enumerate() {
            let value = dataset.value(i)?;
            values.push(format!("{}={}", column.name, format_value(&value)?));
        }
        println!("  row {row}: {}", values.join(", "));
        row += 1;
    }

    Ok(())
}

fn format_value(value: &Value) -> Result<String, Box<dyn std::error::Error>> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Geometry(g) => Ok(g.to_wkt()?),
        other => Ok(other.to_string()),
    }
}
