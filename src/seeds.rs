//! Built-in mission catalog served when no TOML catalog is configured.

use crate::domain::{InteractiveContent, MatchingPair, Mission, MissionKind, VocabEntry, Vocabulary};

const MISSION_POINTS: u32 = 100;

fn vocab(pairs: &[(&str, &str)]) -> Vec<VocabEntry> {
  pairs
    .iter()
    .map(|(word, definition)| VocabEntry { word: (*word).into(), definition: (*definition).into() })
    .collect()
}

fn tasks(items: &[&str]) -> Vec<String> {
  items.iter().map(|t| (*t).to_string()).collect()
}

fn informant_mission() -> Mission {
  Mission {
    id: "dp-01".into(),
    title: "The Mysterious Informant".into(),
    objective: "Learn to describe people and create a detailed profile of a mysterious informant.".into(),
    briefing: "Agent, we have intercepted a blurry photo of a key informant. We need you to use your descriptive English skills to create a detailed dossier. Before you proceed, you must complete your training. Your description will be used by our field agents to identify them. Be precise.".into(),
    tasks: tasks(&[
      "Complete the vocabulary training on descriptive adjectives.",
      "Succeed in the agent recognition matching drill.",
      "Write a detailed dossier describing the informant's appearance and speculating on their personality.",
      "Submit your full dossier for review by HQ.",
    ]),
    feedback_prompt: "You are a senior intelligence analyst at a secret agency, known as \"Handler\". A junior agent has submitted a descriptive dossier. Review their English writing. Correct any grammar or spelling mistakes. Suggest more vivid adjectives and descriptive phrases. Check if they correctly used adjectives to describe appearance and personality. Keep your feedback encouraging and within the secret agent theme. For example, start with \"Good work, Agent...\" and end with \"Keep up the good work. Over and out.\"".into(),
    points: MISSION_POINTS,
    kind: MissionKind::Interactive(InteractiveContent {
      informant_image_url: "https://images.unsplash.com/photo-1564564321837-a57b7070ac4f?q=80&w=1974&auto=format&fit=crop".into(),
      vocabulary: Vocabulary {
        appearance: vocab(&[
          ("Tall", "Of great or more than average height."),
          ("Short", "Of less than average height."),
          ("Slender", "Gracefully thin; slim."),
          ("Muscular", "Having well-developed muscles."),
          ("Elegant", "Graceful and stylish in appearance or manner."),
          ("Scruffy", "Shabby and untidy or dirty."),
        ]),
        personality: vocab(&[
          ("Friendly", "Kind and pleasant."),
          ("Mysterious", "Difficult or impossible to understand or explain."),
          ("Confident", "Feeling or showing certainty about oneself."),
          ("Timid", "Showing a lack of courage or confidence; easily frightened."),
          ("Generous", "Willing to give more than is usual or expected."),
          ("Cautious", "Careful to avoid potential problems or dangers."),
        ]),
      },
      matching_pairs: vec![
        MatchingPair {
          id: 1,
          image_url: "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=1974&auto=format&fit=crop".into(),
          description: "He is a friendly man with short, gray hair and a beard. He seems confident.".into(),
        },
        MatchingPair {
          id: 2,
          image_url: "https://images.unsplash.com/photo-1494790108377-be9c29b29330?q=80&w=1974&auto=format&fit=crop".into(),
          description: "She is an elegant woman with long, brown hair. She looks cautious.".into(),
        },
        MatchingPair {
          id: 3,
          image_url: "https://images.unsplash.com/photo-1615109398623-88346a601842?q=80&w=1974&auto=format&fit=crop".into(),
          description: "He is a muscular man with curly hair and a beard. He looks very serious.".into(),
        },
      ],
    }),
  }
}

fn standard_mission(id: &str, title: &str, objective: &str, briefing: &str, task_list: &[&str], prompt: &str) -> Mission {
  Mission {
    id: id.into(),
    title: title.into(),
    objective: objective.into(),
    briefing: briefing.into(),
    tasks: tasks(task_list),
    feedback_prompt: prompt.into(),
    points: MISSION_POINTS,
    kind: MissionKind::Standard,
  }
}

/// The six missions every fresh process starts with.
pub fn seed_missions() -> Vec<Mission> {
  vec![
    informant_mission(),
    standard_mission(
      "da-01",
      "A Day in the Life",
      "Document your daily routine to establish a cover identity.",
      "To operate effectively, every agent needs a solid cover story. Your mission is to write a detailed log of a typical day. Use present tense and include specific times and activities. This will be your official cover profile.",
      &[
        "List your morning activities from waking up to going to school.",
        "Describe your afternoon, including school and after-school activities.",
        "Detail your evening routine until you go to bed.",
        "Use time-related vocabulary (e.g., \"in the morning,\" \"at 8:00 AM,\" \"after that,\" \"before dinner\").",
      ],
      "You are an experienced spy master reviewing a junior agent's cover story about their daily routine. Check for correct use of present tense, time prepositions (in, at, on), and sequencing words. Ensure the routine is detailed and believable. Provide feedback in a professional, spy-themed tone.",
    ),
    standard_mission(
      "dir-01",
      "The Secret Dead Drop",
      "Write clear directions to a secret dead drop location for another agent to follow.",
      "An allied agent needs to retrieve a package from a dead drop location. Your mission is to write foolproof directions. Use landmarks and prepositions of place. The success of their mission depends on your clarity.",
      &[
        "Choose a starting point (e.g., your school gate).",
        "Write step-by-step directions to a final location (e.g., the library).",
        "Use command verbs (e.g., \"Turn left,\" \"Go straight,\" \"Walk past\").",
        "Include landmarks (e.g., \"next to the post office,\" \"across from the park\").",
      ],
      "You are a logistics officer for a spy agency. A field agent has written directions for a dead drop. Review them for clarity, accuracy, and correct use of directional language and prepositions. Point out any ambiguities that could compromise the mission. Frame your feedback as a security review.",
    ),
    standard_mission(
      "hob-01",
      "Skill Profile",
      "Create a profile of your hobbies and skills to identify your potential in the agency.",
      "HQ is assessing agents for specialized roles. We need to know what you do in your downtime. Write about your hobbies and interests. This will help us understand your unique talents.",
      &[
        "Write about two or three of your favorite hobbies.",
        "Explain why you enjoy them.",
        "Describe any special skills you have because of these hobbies (e.g., teamwork from playing soccer, patience from drawing).",
        "Use gerunds (e.g., \"I like playing...\") and infinitives (e.g., \"I want to learn...\").",
      ],
      "You are a talent scout for a secret intelligence agency. You are reviewing a candidate's profile based on their hobbies. Check for correct use of gerunds and infinitives. Evaluate how they connect their hobbies to skills. Give encouraging feedback on their potential and how their skills could be used in the agency.",
    ),
    standard_mission(
      "pe-01",
      "After Action Report",
      "Write a report about a significant past event in your life.",
      "Every agent has a history. Your mission is to write an \"After Action Report\" on a memorable past experience, like a vacation, a school event, or a personal achievement. Use the past tense to narrate the events clearly.",
      &[
        "Choose a memorable event from your past.",
        "Describe what happened, where it happened, and who was with you.",
        "Explain why this event was important or memorable to you.",
        "Use simple past and past continuous tenses correctly.",
      ],
      "You are a debriefing officer reviewing an agent's report on a past event. Check for correct usage of past tenses (simple past, past continuous). Ensure the narrative is clear and well-structured. Provide feedback in the formal tone of a report review, suggesting improvements for clarity and detail.",
    ),
    standard_mission(
      "fp-01",
      "Operation: Future",
      "Outline your future plans and ambitions for a long-term strategy assessment.",
      "A great agent always thinks ahead. Your mission is to outline your plans for the future. What are your goals for next year, in five years, and in ten years? HQ needs to know your long-term ambitions to plan your career path.",
      &[
        "Write about your academic goals for the next year.",
        "Describe a personal skill you want to develop.",
        "Talk about your dream job or what you want to do after you finish school.",
        "Use future tenses like \"will,\" \"be going to,\" and \"would like to.\"",
      ],
      "You are a career development advisor at a spy agency. You are reviewing an agent's long-term plan. Check for the correct use of future tenses. Offer advice and encouragement on their goals. Your feedback should be motivational and forward-looking, like a mentor guiding a promising young agent.",
    ),
  ]
}
