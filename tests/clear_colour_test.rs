#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour_without_a_scene() {
    use view_ngin::Color;
    use view_ngin::view::{FrameTestResult, run_with_probe};

    let mut frame = 0u32;
    run_with_probe(
        None,
        Box::new(|ctx| {
            // White survives the sRGB surface encoding unchanged.
            ctx.clear_colour = Color::WHITE;
        }),
        Box::new(move |texture| {
            frame += 1;
            if frame > 1 {
                for pixel in texture.pixels() {
                    assert_eq!(pixel.0, [255u8, 255, 255, 255]);
                }
                return Ok(FrameTestResult::Passed);
            }
            Ok(FrameTestResult::Waiting)
        }),
    )
    .expect("Failed to run the viewer for the clear colour test.");
}
