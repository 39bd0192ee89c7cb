use serde_json::json;
use storycrafter::media::{data_uri, parse_data_uri, pcm_sample_rate, pcm_to_wav};
use storycrafter::{
    Config, ContinueStoryResponse, ErrorCode, GenerateVideoOutput, MediaReference, Operation,
    OperationState, PrimaryVisual, Story, StoryError, StoryPart, StoryPartFields, Validate,
};

fn fields(text: &str) -> StoryPartFields {
    StoryPartFields {
        text: text.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_video_takes_precedence_over_image() {
    let mut part = StoryPart::from_fields(1, fields("Felix gasped."));
    assert_eq!(part.primary_visual(), PrimaryVisual::Loading);

    part.fields.image_url = Some("https://picsum.photos/600/400?random=0.5".to_string());
    assert!(matches!(part.primary_visual(), PrimaryVisual::Image(_)));

    part.fields.video_url = Some("data:video/mp4;base64,AAAA".to_string());
    assert_eq!(
        part.primary_visual(),
        PrimaryVisual::Video("data:video/mp4;base64,AAAA")
    );
}

#[test]
fn test_story_numbers_parts_and_builds_transcript() {
    let mut story = Story::new();
    assert!(story.is_empty());
    assert_eq!(story.transcript(), "");

    story.push(fields("One."));
    let second = story.push(fields("Two."));
    assert_eq!(second.id, 2);
    assert_eq!(story.transcript(), "One.\n\nTwo.");
}

#[test]
fn test_response_serializes_for_the_ui() {
    let success = ContinueStoryResponse::success(StoryPartFields {
        text: "Felix gasped.".to_string(),
        image_url: Some("https://picsum.photos/600/400?random=0.1".to_string()),
        image_hint: Some("fantasy magical".to_string()),
        ..Default::default()
    });
    assert_eq!(
        serde_json::to_value(&success).unwrap(),
        json!({
            "data": {
                "text": "Felix gasped.",
                "imageUrl": "https://picsum.photos/600/400?random=0.1",
                "imageHint": "fantasy magical"
            },
            "error": null
        })
    );

    let failure = ContinueStoryResponse::failure(ErrorCode::AiEmptyResponse);
    assert_eq!(
        serde_json::to_value(&failure).unwrap(),
        json!({ "data": null, "error": "AI_EMPTY_RESPONSE" })
    );
    assert_eq!(ErrorCode::ApiFailure.to_string(), "API_FAILURE");
}

#[test]
fn test_story_part_flattens_fields() {
    let part = StoryPart::from_fields(3, fields("Felix gasped."));
    assert_eq!(
        serde_json::to_value(&part).unwrap(),
        json!({ "id": 3, "text": "Felix gasped." })
    );
}

#[test]
fn test_only_empty_result_maps_to_empty_response_code() {
    assert_eq!(StoryError::EmptyResult.code(), ErrorCode::AiEmptyResponse);
    assert_eq!(
        StoryError::GenerationFailed("boom".into()).code(),
        ErrorCode::ApiFailure
    );
    assert_eq!(StoryError::Validation("x".into()).code(), ErrorCode::ApiFailure);
}

#[test]
fn test_operation_states() {
    let mut operation = Operation {
        name: "operations/1".to_string(),
        ..Default::default()
    };
    assert_eq!(operation.state(), OperationState::Pending);

    operation.done = true;
    assert_eq!(operation.state(), OperationState::DoneNoMedia);

    let parsed: Operation = serde_json::from_value(json!({
        "name": "operations/1",
        "done": true,
        "output": { "content": [ {}, { "media": { "url": "https://example.com/v.mp4" } } ] }
    }))
    .unwrap();
    assert_eq!(
        parsed.state(),
        OperationState::DoneSuccess(&MediaReference::new("https://example.com/v.mp4"))
    );

    let errored: Operation = serde_json::from_value(json!({
        "name": "operations/1",
        "done": true,
        "error": { "message": "blocked" },
        "output": { "content": [ { "media": { "url": "https://example.com/v.mp4" } } ] }
    }))
    .unwrap();
    assert_eq!(errored.state(), OperationState::DoneError("blocked"));

    let blank_url: Operation = serde_json::from_value(json!({
        "name": "operations/1",
        "done": true,
        "output": { "content": [ { "media": { "url": "  " } } ] }
    }))
    .unwrap();
    assert_eq!(blank_url.state(), OperationState::DoneNoMedia);
}

#[test]
fn test_data_uri_helpers() {
    let uri = data_uri("video/mp4", "AAAA");
    assert_eq!(uri, "data:video/mp4;base64,AAAA");
    assert_eq!(parse_data_uri(&uri), Some(("video/mp4", "AAAA")));
    assert_eq!(parse_data_uri("https://example.com/a.png"), None);
    assert_eq!(parse_data_uri("data:;base64,AAAA"), None);
    assert_eq!(parse_data_uri("data:video/mp4;base64,"), None);

    let output = GenerateVideoOutput {
        video_data_uri: "not a data uri".to_string(),
    };
    assert!(matches!(output.validate(), Err(StoryError::Validation(_))));
}

#[test]
fn test_pcm_helpers() {
    assert_eq!(pcm_sample_rate("audio/L16;codec=pcm;rate=24000"), Some(24_000));
    assert_eq!(pcm_sample_rate("audio/L16; rate=16000"), Some(16_000));
    assert_eq!(pcm_sample_rate("audio/wav"), None);

    let wav = pcm_to_wav(&[0, 0, 1, 0], 1, 24_000, 16).unwrap();
    assert_eq!(wav.len(), 48);
    assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 40);
    // byte rate: 24000 samples/s * 2 bytes
    assert_eq!(u32::from_le_bytes(wav[28..32].try_into().unwrap()), 48_000);
    assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 4);

    assert_eq!(pcm_to_wav(&[0, 0], 1, u32::MAX, 16), None);
    assert_eq!(pcm_to_wav(&[0, 0], u16::MAX, 24_000, 16), None);
}

#[test]
fn test_base_url_gets_trailing_slash() {
    let config = Config::new(Some("k".to_string()))
        .unwrap()
        .with_base_url("http://localhost:8080/v1beta")
        .unwrap();
    assert_eq!(config.base_url.as_str(), "http://localhost:8080/v1beta/");

    let empty_key = Config::new(Some(String::new())).unwrap();
    assert!(matches!(
        empty_key.require_api_key(),
        Err(StoryError::MissingApiKey)
    ));
}
