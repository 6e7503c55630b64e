use crate::cmd::{report_delivery, PixelsArgs};
use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: PixelsArgs, format: OutputFormat) -> CliResult<i32> {
    if args.data.len() % 3 != 0 {
        return Err(CliError::new(
            USAGE,
            format!(
                "--data needs R,G,B triples, got {} values",
                args.data.len()
            ),
        ));
    }

    let mut client = args.client.client()?;
    client
        .set_pixel_count(args.data.len() / 3)
        .map_err(|err| client_error("invalid pixel count", err))?;
    for (index, rgb) in args.data.chunks_exact(3).enumerate() {
        client
            .set_pixel(index, rgb[0], rgb[1], rgb[2])
            .map_err(|err| client_error("invalid pixel", err))?;
    }

    let delivery = client
        .write_pixels()
        .map_err(|err| client_error("send failed", err))?;
    report_delivery(&client, delivery, format)
}
