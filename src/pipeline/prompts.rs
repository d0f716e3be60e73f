use super::analysis::SpeakerProfile;
use crate::segment::Section;

pub fn search(topic: &str) -> String {
    format!("Research this topic and give me an overview: {}", topic)
}

pub fn video(topic: &str) -> String {
    format!(
        "Based on the video content, give me an overview of this topic:\n{}",
        topic
    )
}

pub fn synthesis(topic: &str, search_text: &str, video_text: &str) -> String {
    format!(
        r#"You are a research analyst. Information about "{topic}" was gathered from two sources.

SEARCH RESULTS:
{search_text}

VIDEO CONTENT:
{video_text}

Write a synthesis that:
1. Identifies the key themes and insights from both sources
2. Points out where the sources complement or contradict each other
3. Gives an overall analysis of the topic based on this research
4. Stays concise but thorough (3-4 paragraphs)

Bring the best insights of both sources together into one coherent narrative."#
    )
}

pub fn report(topic: &str, synthesis_text: &str, video_url: Option<&str>, sources_text: &str) -> String {
    format!(
        "# Research Report: {topic}\n\n\
         ## Executive Summary\n\n\
         {synthesis_text}\n\n\
         ## Video Source\n\
         - **URL**: {video}\n\n\
         ## Additional Sources\n\
         {sources_text}\n\n\
         ---\n\
         *Report generated from web search and video analysis*\n",
        video = video_url.unwrap_or("none"),
    )
}

pub fn script(topic: &str, search_text: &str, video_text: &str) -> String {
    format!(
        r#"Create a natural, engaging podcast conversation between Dr. Lisa (research expert) and Mike (curious interviewer) about "{topic}".

Use this research:

SEARCH FINDINGS:
{search_text}

VIDEO INSIGHTS:
{video_text}

The dialogue should have:
- Mike introducing the topic and asking questions
- Dr. Lisa explaining the key concepts and insights
- A natural back-and-forth (5-7 exchanges)
- Follow-up questions from Mike
- Dr. Lisa summing up the main takeaways
- A conversational, accessible tone (3-4 minutes when spoken)

Use exactly this format, one line per turn:
Mike: [opening question]
Dr. Lisa: [expert response]
Mike: [follow-up]
Dr. Lisa: [explanation]
[continue...]"#
    )
}

pub fn analysis(transcript: &str) -> String {
    format!(
        r#"Analyze this podcast transcript and provide:
1. The distinct speakers with their roles and characteristics
2. A segmentation of the content into thematic sections
3. The key topics and themes of each section

Transcript:
{transcript}

Return a JSON response with this structure:
{{
    "speakers": {{
        "speaker_name": {{
            "role": "description of their role/expertise",
            "characteristics": "physical and personality traits for image generation"
        }}
    }},
    "sections": [
        {{
            "title": "section title",
            "start_text": "first few words to identify start",
            "end_text": "last few words to identify end",
            "theme": "main theme/topic",
            "mood": "visual mood/atmosphere",
            "key_concepts": ["concept1", "concept2"],
            "duration_estimate": estimated_seconds
        }}
    ]
}}"#
    )
}

pub fn speaker_portrait(name: &str, profile: &SpeakerProfile) -> String {
    format!(
        r#"Create a detailed image generation prompt for a professional podcast speaker:
Name: {name}
Role: {role}
Characteristics: {characteristics}

Focus on a professional appearance, clear facial features, a fitting background and good lighting.
Keep it realistic and professional.

Return only the image generation prompt, no additional text."#,
        role = profile.role,
        characteristics = profile.characteristics,
    )
}

pub fn background(section: &Section) -> String {
    format!(
        r#"Create a detailed image generation prompt for a podcast video background based on this section:

Title: {title}
Theme: {theme}
Mood: {mood}
Key Concepts: {concepts}

The image should be:
- Abstract and not distracting from the speakers
- Professional and modern
- Relevant to the theme and concepts
- Suitable as a 16:9 video background
- Visually appealing but not overwhelming

Return only the image generation prompt, no additional text."#,
        title = section.title,
        theme = section.theme,
        mood = section.mood,
        concepts = section.key_concepts.join(", "),
    )
}
