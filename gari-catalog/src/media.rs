//! URL construction for the public media bucket.
//!
//! Car photos are keyed by a filename derived from the listing name. Two
//! legacy uploads predate the naming convention and keep their original
//! object names.

const PHOTO_BUCKET_BASE: &str =
    "https://cdn.gari.rentals/storage/v1/object/public/car-photos";

/// Pre-signed showcase reel played on the landing screen. The signature is
/// long-lived and rotated together with the asset itself.
const SHOWCASE_VIDEO_URL: &str =
    "https://cdn.gari.rentals/storage/v1/object/sign/media/fleet-showcase.mp4?token=eyJhbGciOiJIUzI1NiJ9.c2hvd2Nhc2U.9tQmVhcmVy";

/// Public photo URL for a car listing.
///
/// Convention: lowercase, spaces collapsed to hyphens, `.jpg`. The two
/// exceptions were uploaded before the convention existed and are matched
/// by listing name.
pub fn car_photo_url(car_name: &str) -> String {
    let object = match car_name {
        // Legacy uploads, object names kept as-is
        "Mazda CX-5" => "mazda-cx5.jpg".to_string(),
        "Land Rover Defender" => "defender-2021.jpg".to_string(),
        _ => {
            let slug = car_name
                .to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("-");
            format!("{}.jpg", slug)
        }
    };
    format!("{}/{}", PHOTO_BUCKET_BASE, object)
}

/// Fixed pre-signed URL for the fleet showcase video.
pub fn showcase_video_url() -> &'static str {
    SHOWCASE_VIDEO_URL
}
