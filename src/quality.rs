use std::cmp::Ordering;

use crate::probe::MediaDescriptor;

const HEVC_TOKENS: [&str; 3] = ["265", "HEVC", "hevc"];

/// Whether a codec name denotes HEVC/H.265 (case-sensitive substring match)
pub fn is_hevc(codec_name: &str) -> bool {
    HEVC_TOKENS.iter().any(|token| codec_name.contains(token))
}

/// Rank two descriptors by their first video stream.
///
/// Precedence: pixel area, then HEVC over anything else, then container
/// bit rate. `Greater` means `a` is the better copy, `Equal` means the two
/// are interchangeable.
pub fn compare(a: &MediaDescriptor, b: &MediaDescriptor) -> Ordering {
    let (va, vb) = (a.primary_video(), b.primary_video());

    va.pixel_area()
        .cmp(&vb.pixel_area())
        .then_with(|| is_hevc(&va.codec_name).cmp(&is_hevc(&vb.codec_name)))
        .then_with(|| a.bit_rate().cmp(&b.bit_rate()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(width: u32, height: u32, codec: &str, bit_rate: u64) -> MediaDescriptor {
        MediaDescriptor::video(width, height, codec, bit_rate)
    }

    #[test]
    fn test_hevc_detection() {
        assert!(is_hevc("hevc"));
        assert!(is_hevc("HEVC"));
        assert!(is_hevc("h265"));
        assert!(is_hevc("x265"));
        assert!(is_hevc("265"));
        assert!(!is_hevc("h264"));
        assert!(!is_hevc("Hevc"));
        assert!(!is_hevc("av1"));
        assert!(!is_hevc(""));
    }

    #[test]
    fn test_area_dominates() {
        let small_but_rich = d(1280, 720, "hevc", 40_000_000);
        let large_but_poor = d(1920, 1080, "mpeg2video", 1_000);
        assert_eq!(compare(&large_but_poor, &small_but_rich), Ordering::Greater);
        assert_eq!(compare(&small_but_rich, &large_but_poor), Ordering::Less);
    }

    #[test]
    fn test_area_not_width() {
        // 1440x1080 has the larger area despite the smaller width
        let wide = d(1920, 800, "h264", 1);
        let tall = d(1440, 1080, "h264", 1);
        assert_eq!(compare(&tall, &wide), Ordering::Greater);
    }

    #[test]
    fn test_hevc_beats_bitrate_at_equal_area() {
        let avc = d(1920, 1080, "h264", 5_000_000);
        let hevc = d(1920, 1080, "hevc", 3_000_000);
        assert_eq!(compare(&hevc, &avc), Ordering::Greater);
        assert_eq!(compare(&avc, &hevc), Ordering::Less);
    }

    #[test]
    fn test_bitrate_breaks_remaining_ties() {
        let low = d(3840, 2160, "hevc", 10_000_000);
        let high = d(3840, 2160, "x265", 20_000_000);
        assert_eq!(compare(&high, &low), Ordering::Greater);

        let low = d(1280, 720, "h264", 2_000_000);
        let high = d(1280, 720, "vp9", 2_000_001);
        assert_eq!(compare(&high, &low), Ordering::Greater);
    }

    #[test]
    fn test_equivalent_descriptors() {
        let a = d(1920, 1080, "hevc", 8_000_000);
        let b = d(1920, 1080, "h265", 8_000_000);
        assert_eq!(compare(&a, &b), Ordering::Equal);
        assert_eq!(compare(&b, &a), Ordering::Equal);
    }

    #[test]
    fn test_antisymmetric() {
        let samples = [
            d(1920, 1080, "h264", 5_000_000),
            d(1920, 1080, "hevc", 3_000_000),
            d(1920, 1080, "hevc", 4_000_000),
            d(1280, 720, "hevc", 9_000_000),
            d(3840, 2160, "h264", 1_000_000),
            d(3840, 2160, "av1", 1_000_000),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(compare(a, b), compare(b, a).reverse());
            }
        }
    }
}
