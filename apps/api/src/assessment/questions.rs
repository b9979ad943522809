//! The fixed self-assessment questionnaire.

use serde::Serialize;

/// A yes/no question tagged with the topic it checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub text: &'static str,
    pub topic: &'static str,
}

/// Order matters: answers are indexed by position in this list.
pub const QUIZ_QUESTIONS: &[Question] = &[
    Question {
        text: "Votre équipe est-elle formée aux techniques d'un bon accueil téléphonique ?",
        topic: "Accueil téléphonique",
    },
    Question {
        text: "Vos collaborateurs savent-ils remplir efficacement un carnet de RDV ?",
        topic: "Organisation du travail",
    },
    Question {
        text: "Entraînez-vous vos collaborateurs à l'accueil client ?",
        topic: "Accueil physique",
    },
    Question {
        text: "L'équipe s'entraîne-t-elle à faire un bon diagnostic sous forme de mise en situation ?",
        topic: "Communication verbale",
    },
    Question {
        text: "La propreté du salon est-elle optimum ?",
        topic: "Propreté et image",
    },
    Question {
        text: "Y a t-il des règles de bonnes conduites écrites à respecter en salon ?",
        topic: "Comportements de l'équipe",
    },
    Question {
        text: "Avez-vous adopté un code vestimentaire pour l'ensemble de l'équipe ?",
        topic: "Propreté et image",
    },
    Question {
        text: "Avez-vous des fiches postes écrites ?",
        topic: "Responsabilités et délégation",
    },
    Question {
        text: "Envoyez-vous régulièrement vos collaborateurs en formation ?",
        topic: "Formations et mise en situation",
    },
    Question {
        text: "Vos tarifs sont-ils clairs pour toute l'équipe et pour vos clients ?",
        topic: "Organisation du travail",
    },
    Question {
        text: "Possédez-vous un fichier commercial à jour ?",
        topic: "Organisation du travail",
    },
    Question {
        text: "Organisez-vous occasionnellement des évènements festifs ?",
        topic: "Baromètre de l'ambiance",
    },
    Question {
        text: "Faites-vous des entretiens de suivi avec vos collaborateurs ?",
        topic: "Pratiques managériales",
    },
    Question {
        text: "Fixez-vous des objectifs chiffrés ?",
        topic: "Pratiques managériales",
    },
    Question {
        text: "Mettez-vous des réunions en place régulièrement ?",
        topic: "Pratiques managériales",
    },
    Question {
        text: "Avez-vous des règles de fonctionnement écrites ?",
        topic: "Organisation du travail",
    },
];

/// Every topic of the questionnaire, once each, in first-occurrence order.
/// This is the topic list sent to the generator to build the catalog.
pub fn distinct_topics(questions: &[Question]) -> Vec<String> {
    let mut topics: Vec<String> = Vec::new();
    for question in questions {
        if !topics.iter().any(|t| t == question.topic) {
            topics.push(question.topic.to_string());
        }
    }
    topics
}
