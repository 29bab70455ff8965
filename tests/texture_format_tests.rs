use view_ngin::TextureFormat;
use view_ngin::data_structures::texture::PixelData;

#[test]
fn float_pixels_choose_the_four_channel_float_format() {
    let pixels = PixelData::Float(vec![0.0; 16]);
    assert_eq!(pixels.texture_format(), TextureFormat::Rgba32Float);
    assert_eq!(pixels.bytes_per_texel(), 16);
}

#[test]
fn byte_pixels_choose_the_four_channel_byte_format() {
    let pixels = PixelData::Byte(vec![0; 16]);
    assert_eq!(pixels.texture_format(), TextureFormat::Rgba8Unorm);
    assert_eq!(pixels.bytes_per_texel(), 4);
}

#[test]
fn extent_check_requires_four_components_per_texel() {
    let pixels = PixelData::Byte(vec![0; 2 * 2 * 4]);
    assert!(pixels.matches_extent(2, 2));
    assert!(!pixels.matches_extent(2, 3));
    assert!(!pixels.matches_extent(4, 4));

    let pixels = PixelData::Float(vec![0.0; 3 * 5 * 4]);
    assert!(pixels.matches_extent(3, 5));
    assert!(!pixels.matches_extent(3, 4));
}

#[test]
fn empty_payloads_match_no_extent() {
    let pixels = PixelData::Byte(Vec::new());
    assert!(pixels.is_empty());
    assert!(!pixels.matches_extent(1, 1));
    assert!(pixels.matches_extent(0, 0));
}
