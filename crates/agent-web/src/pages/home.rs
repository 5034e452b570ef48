//! Home Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"Math Problem Solver"</h1>
                <p class="tagline">"Ask any math question and get a step-by-step answer"</p>
                <div class="cta">
                    <a href="/solve" class="btn btn-primary">"Start Solving"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"🧮 Step-by-step"</h3>
                    <p>"Every answer is worked through point by point, not just stated."</p>
                </div>
                <div class="feature">
                    <h3>"📚 Research tools"</h3>
                    <p>"The agent can consult Wikipedia, arXiv, and the web when a question needs background."</p>
                </div>
                <div class="feature">
                    <h3>"🔑 Your key"</h3>
                    <p>"Bring your own Groq API key and pick from four models in the sidebar."</p>
                </div>
            </section>
        </div>
    }
}
