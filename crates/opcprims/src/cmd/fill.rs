use opcprims_client::hsv;

use crate::cmd::{report_delivery, FillArgs};
use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: FillArgs, format: OutputFormat) -> CliResult<i32> {
    let color = match (args.color, args.hue) {
        (Some(color), _) => color,
        (None, Some(hue)) => hsv(hue, 1.0, 1.0),
        (None, None) => return Err(CliError::new(USAGE, "one of --color or --hue is required")),
    };

    let mut client = args.client.client()?;
    client
        .set_pixel_count(args.count)
        .map_err(|err| client_error("invalid pixel count", err))?;
    for index in 0..args.count {
        client
            .set_pixel(index, color[0], color[1], color[2])
            .map_err(|err| client_error("invalid pixel", err))?;
    }

    let delivery = client
        .write_pixels()
        .map_err(|err| client_error("send failed", err))?;
    report_delivery(&client, delivery, format)
}
