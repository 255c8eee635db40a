#[cfg(test)]
mod tests {

    use std::path::PathBuf;
    use crate::core::{AppConfig, ScaleMode};

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.output_formats.first().map(String::as_str), Some("mp4"));
        assert!(config.pixel_formats.contains(&"yuv420p".to_string()));
        assert_eq!(config.presets.len(), 3);
        assert_eq!((config.default_width, config.default_height), (1280, 720));
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{
            "ffmpeg_path": "/opt/ffmpeg/bin/ffmpeg",
            "jpeg_quality": 80,
            "default_scale_mode": "aspect_pad"
        }"#;

        let config = AppConfig::from_json(json).expect("Failed to parse partial config");
        assert_eq!(config.ffmpeg_path, PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        assert_eq!(config.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.max_width, 7680);
        assert_eq!(config.default_scale_mode, ScaleMode::AspectPad);
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = AppConfig::default();
        config.output_formats = vec!["mkv".to_string()];

        let serialized = serde_json::to_string(&config).expect("Failed to serialize config");
        let deserialized = AppConfig::from_json(&serialized).expect("Failed to deserialize config");

        assert_eq!(deserialized.output_formats, vec!["mkv".to_string()]);
        assert_eq!(deserialized.presets, config.presets);
    }

    #[test]
    fn test_rejects_tiny_max_resolution() {
        let json = r#"{ "max_width": 1 }"#;
        assert!(AppConfig::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_oversized_max_resolution() {
        let json = r#"{ "max_width": 4294967295 }"#;
        assert!(AppConfig::from_json(json).is_err());

        let json = r#"{ "max_width": 16384, "max_height": 16384 }"#;
        assert!(AppConfig::from_json(json).is_ok());
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(AppConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_config_path_location() {
        let path = AppConfig::config_path();
        assert!(path.ends_with("video-tools/config.json"));
    }
}
