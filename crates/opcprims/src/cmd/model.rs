use opcprims_client::{load_model, Model};
use serde::Serialize;

use crate::cmd::ModelArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_fields, print_json, OutputFormat};

#[derive(Serialize)]
struct ModelOutput {
    schema_id: &'static str,
    path: String,
    pixels: usize,
    unused: usize,
    bounds: Option<BoundsOutput>,
}

#[derive(Serialize)]
struct BoundsOutput {
    min: [f32; 3],
    max: [f32; 3],
    center: [f32; 3],
}

pub fn run(args: ModelArgs, format: OutputFormat) -> CliResult<i32> {
    let model = load_model(&args.path).map_err(|err| client_error("model load failed", err))?;
    let out = summarize(&model, args.path.display().to_string());

    match format {
        OutputFormat::Json => print_json(&out),
        other => {
            let mut rows = vec![
                ("path", out.path.clone()),
                ("pixels", out.pixels.to_string()),
                ("unused", out.unused.to_string()),
            ];
            if let Some(b) = &out.bounds {
                rows.push(("min", format!("{:?}", b.min)));
                rows.push(("max", format!("{:?}", b.max)));
                rows.push(("center", format!("{:?}", b.center)));
            }
            print_fields(&rows, other);
        }
    }

    Ok(SUCCESS)
}

fn summarize(model: &Model, path: String) -> ModelOutput {
    ModelOutput {
        schema_id: "https://schemas.3leaps.dev/opcprims/cli/v1/model-summary.schema.json",
        path,
        pixels: model.len(),
        unused: model.unused(),
        bounds: model.bounds().map(|b| BoundsOutput {
            min: b.min.to_array(),
            max: b.max.to_array(),
            center: b.center().to_array(),
        }),
    }
}
