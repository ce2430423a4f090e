//! Fixed user-facing text: category explanations and the FAQ.

use serde::Serialize;

/// Message shown for a label outside the four known categories.
pub const UNRECOGNIZED_MESSAGE: &str = "prediction category not recognized";

const CATEGORY_MESSAGES: &[(&str, &str)] = &[
    ("unacc", "Unacceptable: this car is not worth buying."),
    ("acc", "Acceptable: this car is reasonably worth buying."),
    ("good", "Good: this car is worth buying."),
    ("vgood", "Very good: this car is highly worth buying."),
];

/// A predicted label together with its canned explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub label: String,
    pub message: &'static str,
    pub recognized: bool,
}

pub fn explain(label: &str) -> Explanation {
    match CATEGORY_MESSAGES.iter().find(|(l, _)| *l == label) {
        Some((_, message)) => Explanation {
            label: label.to_string(),
            message: *message,
            recognized: true,
        },
        None => Explanation {
            label: label.to_string(),
            message: UNRECOGNIZED_MESSAGE,
            recognized: false,
        },
    }
}

pub const FAQ: &[(&str, &str)] = &[
    (
        "What is BUY OR BYE?",
        "A simulation tool backed by a classification model that helps you judge whether a car \
         is worth buying based on a handful of key vehicle attributes.",
    ),
    (
        "How does the evaluation work?",
        "You provide the buying price, maintenance cost, number of doors, passenger capacity, \
         luggage boot size and safety level. Each value is converted to the model's numeric \
         encoding and the classifier assigns an acceptability category.",
    ),
    (
        "What do unacc, acc, good and vgood mean?",
        "unacc: not worth buying. acc: reasonably worth buying. good: worth buying. \
         vgood: highly worth buying.",
    ),
    (
        "Do I have to enter every car by hand?",
        "No. Use `predict` for a single car or `batch` with a CSV file (header optional, \
         columns buying,maint,doors,persons,lug_boot,safety[,class]) to score many at once.",
    ),
    (
        "Is my data stored?",
        "No. Inputs are processed in memory and discarded once the result is written.",
    ),
    (
        "Are the predictions 100% accurate?",
        "No. Results are estimates from a model and its training data; they do not replace a \
         professional inspection of the vehicle.",
    ),
    (
        "Who is this for?",
        "Anyone wanting a first impression before buying a car, students and researchers \
         studying classification systems, and decision-support demos.",
    ),
    (
        "Can I use it for used cars?",
        "Yes, as long as the attributes describe the car's current condition. The result is \
         still a simulation.",
    ),
    (
        "Why can similar cars get different results?",
        "Small changes in attributes such as safety or passenger capacity can move a car across \
         a decision boundary, since each attribute carries its own weight in the model.",
    ),
];
